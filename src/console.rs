use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::clock::{minutes_to_clock, DayResume, LeaveClockTime};

/// Consoleに1日のサマリーを表示するためのtrait。
pub trait ConsolePresenter {
    /// 1日のサマリーを表示する。
    ///
    /// # Arguments
    ///
    /// * `date` - サマリーの日付
    /// * `resume` - 表示するサマリー
    fn show_day_resume(&mut self, date: &NaiveDate, resume: &DayResume) -> Result<()>;
}

/// 1日のサマリーをMarkdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    // 終了していない期間がない場合は、退勤予定時刻の代わりに理由を表示する。
    fn show_day_resume(&mut self, date: &NaiveDate, resume: &DayResume) -> Result<()> {
        let leave = match &resume.should_leave_clock_time {
            LeaveClockTime::At(clock) => format!("- Should leave at: {}", clock),
            LeaveClockTime::Invalid => {
                "- Should leave at: Invalid (no open period to project from)".to_string()
            }
        };
        let lines = [
            format!("## {}", date.format("%Y-%m-%d")),
            format!(
                "- Worked: {}",
                minutes_to_clock(resume.registered_worked_minutes)
            ),
            format!(
                "- Worked until now: {}",
                minutes_to_clock(resume.worked_minutes_until_now)
            ),
            format!("- Break: {}", minutes_to_clock(resume.break_minutes)),
            format!("- Remaining: {}", minutes_to_clock(resume.remaining_minutes())),
            leave,
        ];

        for line in lines {
            writeln!(self.writer, "{}", line)
                .with_context(|| format!("Failed to write day resume: {:?}", resume))?;
        }

        Ok(())
    }
}
