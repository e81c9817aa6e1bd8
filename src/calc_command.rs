use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};

use crate::check_command::parse_date;
use crate::clock::{calculate_worktime_day_resume, parse_duration, parse_marks, DayResume};
use crate::datetime;

/// コマンドラインで渡された打刻を集計するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct CalcArgs {
    #[clap(help = "Comma separated marks in the format HH:mm, e.g. 09:00,12:00,13:00")]
    pub marks: String,

    #[clap(
        short = 'd',
        long = "date",
        help = "Sets a custom date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    pub date: Option<NaiveDate>,

    #[clap(
        short = 'j',
        long = "journey",
        help = "Daily work duration in the format HH:mm",
        default_value = "08:00"
    )]
    pub journey: String,
}

/// `calc`サブコマンドの処理を行う。
///
/// 集計の前に全ての打刻を検証し、不正な打刻があればエラーを返す。
pub fn calc_command(calc: &CalcArgs) -> Result<(NaiveDate, DayResume)> {
    let marks = parse_marks(&calc.marks)
        .with_context(|| format!("Failed to parse marks: {}", calc.marks))?;
    let journey_target_minutes = parse_duration(&calc.journey)
        .with_context(|| format!("Failed to parse journey: {}", calc.journey))?;
    debug!("Marks: {:?}", marks);

    let now = datetime::now();
    let date = calc.date.unwrap_or_else(|| now.date_naive());
    info!("Date: {}, Journey: {} minutes", date, journey_target_minutes);

    let now_minutes = (date == now.date_naive()).then(|| datetime::minute_of_day(&now));

    Ok((
        date,
        calculate_worktime_day_resume(&marks, journey_target_minutes, now_minutes),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::{calc_command, CalcArgs};
    use crate::clock::LeaveClockTime;
    use crate::error::ClockError;

    fn args(marks: &str, journey: &str) -> CalcArgs {
        CalcArgs {
            marks: marks.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 1, 1),
            journey: journey.to_string(),
        }
    }

    #[rstest]
    #[case::first_mark("09:00", "08:00", "17:00")]
    #[case::after_lunch("09:00,12:00,13:00", "08:00", "18:00")]
    #[case::raw_marks("0900,1200,1300", "08:48", "18:48")]
    fn test_calc_command(#[case] marks: &str, #[case] journey: &str, #[case] expected: &str) {
        let (date, resume) = calc_command(&args(marks, journey)).unwrap();

        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(resume.is_missing_pair_mark);
        assert_eq!(
            resume.should_leave_clock_time,
            LeaveClockTime::At(expected.to_string())
        );
    }

    #[test]
    fn test_calc_command_closed_day() {
        let (_, resume) = calc_command(&args("09:00,12:00,13:00,18:00", "08:00")).unwrap();

        assert!(!resume.is_missing_pair_mark);
        assert_eq!(resume.registered_worked_minutes, 480);
        assert_eq!(resume.should_leave_clock_time, LeaveClockTime::Invalid);
    }

    #[test]
    fn test_calc_command_invalid_mark() {
        let error = calc_command(&args("09:00,25:00", "08:00")).unwrap_err();

        assert_eq!(
            error.downcast_ref::<ClockError>(),
            Some(&ClockError::InvalidClockFormat("25:00".to_string()))
        );
    }

    #[test]
    fn test_calc_command_invalid_journey() {
        assert!(calc_command(&args("09:00", "8")).is_err());
    }
}
