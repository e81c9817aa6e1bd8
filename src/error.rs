use thiserror::Error;

/// 打刻の時刻文字列を扱う際に発生するエラー。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    /// `HHmm`形式ではない文字列を整形しようとした。
    #[error("Invalid clock format {0:?}, use: HHmm")]
    Format(String),

    /// 時刻として解釈できない文字列が渡された。
    #[error("Invalid clock {0:?}, use: HH:mm")]
    InvalidClockFormat(String),
}
