//! 表示文言テーブル
//!
//! コアが利用者に返す短いメッセージだけを持つ（画面の文言は対象外）

use crate::types::Language;

/// 言語ごとのメッセージ
#[derive(Debug)]
pub struct Messages {
    /// 画像認識で名前が取れなかったときのプレースホルダ
    pub unknown_item: &'static str,
    /// 単位が取れなかったとき
    pub unknown_unit: &'static str,
    /// 値切りのコツが取れなかったとき
    pub default_tip: &'static str,
    /// 地図ピンのタイトルが無いとき
    pub map_spot_title: &'static str,
    pub identify_failed: &'static str,
    pub price_failed: &'static str,
    pub camera_failed: &'static str,
    pub translate_failed: &'static str,
    pub map_failed: &'static str,
    /// APIキー未設定時の案内
    pub setup_required: &'static str,
    pub retry: &'static str,
}

/// 価格が取れなかったときの既定レンジ（言語共通）
pub const DEFAULT_PRICE_RANGE: &str = "20,000 - 50,000";

/// 出典タイトルの既定値
pub const DEFAULT_SOURCE_TITLE: &str = "Ref";

/// 出典URIの既定値
pub const DEFAULT_SOURCE_URI: &str = "#";

const KO: Messages = Messages {
    unknown_item: "알 수 없음",
    unknown_unit: "단위 미정",
    default_tip: "흥정이 필요합니다.",
    map_spot_title: "지도에서 확인",
    identify_failed: "인식 실패",
    price_failed: "가격 조회 실패",
    camera_failed: "카메라를 사용할 수 없습니다",
    translate_failed: "번역 실패",
    map_failed: "지도 조회 실패",
    setup_required: "연결 설정이 필요합니다.",
    retry: "다시 시도해주세요.",
};

const VN: Messages = Messages {
    unknown_item: "Không xác định",
    unknown_unit: "Chưa rõ đơn vị",
    default_tip: "Cần trả giá.",
    map_spot_title: "Xem trên bản đồ",
    identify_failed: "Lỗi nhận diện",
    price_failed: "Lỗi tìm giá",
    camera_failed: "Không thể dùng máy ảnh",
    translate_failed: "Lỗi dịch",
    map_failed: "Lỗi tải bản đồ",
    setup_required: "Cần thiết lập kết nối.",
    retry: "Hãy thử lại.",
};

/// 言語に対応するメッセージを取得
pub fn messages(lang: Language) -> &'static Messages {
    match lang {
        Language::Korean => &KO,
        Language::Vietnamese => &VN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_not_empty() {
        for lang in Language::ALL {
            let m = messages(lang);
            assert!(!m.unknown_item.is_empty());
            assert!(!m.unknown_unit.is_empty());
            assert!(!m.default_tip.is_empty());
            assert!(!m.setup_required.is_empty());
        }
    }

    #[test]
    fn test_messages_per_language() {
        assert_eq!(messages(Language::Korean).unknown_item, "알 수 없음");
        assert_eq!(messages(Language::Vietnamese).unknown_item, "Không xác định");
        assert_eq!(messages(Language::Vietnamese).default_tip, "Cần trả giá.");
    }
}
