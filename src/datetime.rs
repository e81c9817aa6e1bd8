use chrono::{DateTime, Local, Timelike};

#[cfg(not(test))]
/// 現在のLocal時間を取得する。
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// テスト時に利用するモック時間を取得する。
#[cfg(test)]
pub mod mock_datetime {
    use std::cell::RefCell;

    use super::DateTime;
    use super::Local;

    thread_local! {
        static MOCK_TIME: RefCell<Option<DateTime<Local>>> = RefCell::new(None);
    }

    /// モック時間を取得する。
    pub fn now() -> DateTime<Local> {
        MOCK_TIME.with(|cell| cell.borrow().as_ref().cloned().unwrap_or_else(Local::now))
    }

    /// モック時間を設定する。
    pub fn set_mock_time(time: DateTime<Local>) {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = Some(time));
    }

    // 設定したモック時間をクリアする。
    pub fn clear_mock_time() {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = None);
    }
}

#[cfg(test)]
pub use mock_datetime::now;

/// 0時からの経過分を返す。秒は切り捨てる。
pub fn minute_of_day(datetime: &DateTime<Local>) -> i64 {
    i64::from(datetime.hour() * 60 + datetime.minute())
}
