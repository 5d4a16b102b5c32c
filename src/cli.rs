use clap::{Parser, Subcommand};
use dalat_market_common::Language;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dalat-market")]
#[command(about = "ダラット夜市 AI価格スキャナー・翻訳ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 表示言語 (ko/vn)。省略時は設定ファイルの値
    #[arg(short, long, global = true)]
    pub lang: Option<Language>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真から商品名を推定
    Identify {
        /// 写真ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 続けて相場も検索
        #[arg(short, long)]
        price: bool,
    },

    /// 商品名から夜市の相場を検索
    Price {
        /// 商品名
        #[arg(required = true, num_args = 1..)]
        item: Vec<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 韓国語 ⇔ ベトナム語 翻訳（入力側は --lang）
    Translate {
        /// 翻訳するテキスト
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// 市場内の主要地点（地図リンク）
    Spots,

    /// 対話式スキャン（撮影 → 確認 → 相場）
    Scan {
        /// カメラの代わりに使う写真ファイル
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 既定の表示言語を設定 (ko/vn)
        #[arg(long)]
        set_language: Option<Language>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
