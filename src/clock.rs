use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::ClockError;

/// 時刻文字列のデフォルトの区切り文字。
pub const DEFAULT_SEPARATOR: &str = ":";

/// 退勤予定時刻を計算できない場合の表示。
const INVALID_CLOCK_TIME: &str = "Invalid";

/// 1日分の打刻。
///
/// `HH:mm`形式に正規化された時刻と、0時からの経過分を保持する。
/// 生成時に時刻の形式と範囲を検証するため、集計処理では失敗しない。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawMark")]
pub struct Mark {
    clock: String,
    minutes: i64,
}

/// デシリアライズ時に受け取る検証前の打刻。
#[derive(Debug, Deserialize)]
struct RawMark {
    clock: String,
}

impl Mark {
    /// 打刻文字列を検証して`Mark`を返す。
    ///
    /// `HH:mm`形式と、区切り文字のない`HHmm`形式を受け付ける。
    ///
    /// # Arguments
    ///
    /// * `input` - 打刻文字列
    pub fn parse(input: &str) -> Result<Self, ClockError> {
        let trimmed = input.trim();
        let clock = normalize_clock(trimmed)?;
        let (hours, minutes) = split_clock(&clock)?;
        if hours >= 24 || minutes >= 60 {
            return Err(ClockError::InvalidClockFormat(trimmed.to_string()));
        }

        Ok(Self {
            minutes: clock_to_minutes(&clock)?,
            clock,
        })
    }

    /// `HH:mm`形式の時刻。
    pub fn clock(&self) -> &str {
        &self.clock
    }

    /// 0時からの経過分。
    pub fn minutes(&self) -> i64 {
        self.minutes
    }
}

impl TryFrom<RawMark> for Mark {
    type Error = ClockError;

    fn try_from(raw: RawMark) -> Result<Self, Self::Error> {
        Self::parse(&raw.clock)
    }
}

impl FromStr for Mark {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clock)
    }
}

/// 1日の労働時間の集計結果。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkedTime {
    /// 開始と終了の打刻が揃っている期間の合計分。
    pub registered_worked_minutes: i64,
    /// 終了していない期間を現在時刻までとした場合の合計分。
    pub worked_minutes_until_now: i64,
}

/// 退勤予定時刻。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaveClockTime {
    At(String),
    Invalid,
}

impl fmt::Display for LeaveClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveClockTime::At(clock) => f.write_str(clock),
            LeaveClockTime::Invalid => f.write_str(INVALID_CLOCK_TIME),
        }
    }
}

/// 1日の打刻から計算したサマリー。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayResume {
    pub registered_worked_minutes: i64,
    pub worked_minutes_until_now: i64,
    pub break_minutes: i64,
    pub journey_target_minutes: i64,
    pub should_leave_clock_time: LeaveClockTime,
    /// 終了の打刻がない期間が存在する。
    pub is_missing_pair_mark: bool,
}

impl DayResume {
    /// 目標の労働時間に達するまでの残り分。達している場合は0。
    pub fn remaining_minutes(&self) -> i64 {
        (self.journey_target_minutes - self.worked_minutes_until_now).max(0)
    }
}

/// `HH:mm`形式の時刻文字列を0時からの経過分に変換する。
///
/// 区切り文字を取り除いた先頭2桁を時、残りを分として扱う。
/// 範囲は検証しないため`"25:99"`は1599分となる。
pub fn clock_to_minutes(clock: &str) -> Result<i64, ClockError> {
    let invalid = || ClockError::InvalidClockFormat(clock.to_string());
    let digits: String = clock.chars().filter(|c| *c != ':').collect();
    if digits.len() < 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let (hours, minutes) = digits.split_at(2);
    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;

    Ok(hours * 60 + minutes)
}

/// 0時からの経過分を`HH:mm`形式に変換する。
pub fn minutes_to_clock(minutes: i64) -> String {
    minutes_to_clock_with_separator(minutes, DEFAULT_SEPARATOR)
}

/// 0時からの経過分を指定した区切り文字で時刻形式に変換する。
///
/// 負の値は0として扱う。24時間を超える値は繰り上げずにそのまま表示する。
pub fn minutes_to_clock_with_separator(minutes: i64, separator: &str) -> String {
    let minutes = minutes.max(0);
    format!("{:02}{}{:02}", minutes / 60, separator, minutes % 60)
}

/// `HHmm`形式の文字列を`HH:mm`形式に整形する。
pub fn format_clock_string(clock: &str) -> Result<String, ClockError> {
    if clock.chars().count() != 4 || !clock.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClockError::Format(clock.to_string()));
    }

    Ok(format!("{}:{}", &clock[..2], &clock[2..]))
}

/// カンマ区切りの打刻一覧をパースする。
///
/// 空の要素は無視する。順序は入力のまま保持し、時系列順かどうかは検証しない。
pub fn parse_marks(input: &str) -> Result<Vec<Mark>, ClockError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|clock| !clock.is_empty())
        .map(Mark::parse)
        .collect()
}

/// `HH:mm`形式の時間を分に変換する。
///
/// 時刻とは異なり24時間以上の値も受け付ける。
pub fn parse_duration(input: &str) -> Result<i64, ClockError> {
    let trimmed = input.trim();
    let clock = normalize_clock(trimmed)?;
    let (_, minutes) = split_clock(&clock)?;
    if minutes >= 60 {
        return Err(ClockError::InvalidClockFormat(trimmed.to_string()));
    }

    clock_to_minutes(&clock)
}

/// 休憩時間の合計分を計算する。
///
/// 3番目以降の開始の打刻と、その直前の終了の打刻の差を合計する。
/// 最初の打刻の前は休憩として扱わない。
pub fn calculate_break_minutes(marks: &[Mark]) -> i64 {
    marks
        .get(1..)
        .unwrap_or_default()
        .chunks_exact(2)
        .map(|pair| pair[1].minutes() - pair[0].minutes())
        .sum()
}

/// 労働時間を計算する。
///
/// 終了の打刻と直前の開始の打刻の差を合計する。
/// 終了していない期間は`now`が指定された場合のみ`worked_minutes_until_now`に含める。
///
/// # Arguments
///
/// * `marks` - 時系列順の打刻
/// * `now` - 現在時刻の0時からの経過分
pub fn calculate_worked_time_minutes(marks: &[Mark], now: Option<i64>) -> WorkedTime {
    let registered_worked_minutes = marks
        .chunks_exact(2)
        .map(|pair| pair[1].minutes() - pair[0].minutes())
        .sum();
    let in_progress_minutes = match (open_period_start(marks), now) {
        (Some(opening), Some(now)) if now >= opening.minutes() => now - opening.minutes(),
        _ => 0,
    };

    WorkedTime {
        registered_worked_minutes,
        worked_minutes_until_now: registered_worked_minutes + in_progress_minutes,
    }
}

/// 1日のサマリーを計算する。
///
/// 終了していない期間がある場合は、目標の労働時間に達する時刻を退勤予定時刻とする。
/// 既に目標に達している場合は、最後の開始の打刻の時刻となる。
///
/// # Arguments
///
/// * `marks` - 時系列順の打刻
/// * `journey_target_minutes` - 1日の目標労働時間(分)
/// * `now` - 現在時刻の0時からの経過分
pub fn calculate_worktime_day_resume(
    marks: &[Mark],
    journey_target_minutes: i64,
    now: Option<i64>,
) -> DayResume {
    let worked_time = calculate_worked_time_minutes(marks, now);
    let should_leave_clock_time = match open_period_start(marks) {
        Some(opening) => {
            let remaining =
                (journey_target_minutes - worked_time.registered_worked_minutes).max(0);
            LeaveClockTime::At(minutes_to_clock(opening.minutes() + remaining))
        }
        None => LeaveClockTime::Invalid,
    };

    DayResume {
        registered_worked_minutes: worked_time.registered_worked_minutes,
        worked_minutes_until_now: worked_time.worked_minutes_until_now,
        break_minutes: calculate_break_minutes(marks),
        journey_target_minutes,
        should_leave_clock_time,
        is_missing_pair_mark: marks.len() % 2 == 1,
    }
}

/// 終了の打刻がない期間の開始の打刻を返す。
fn open_period_start(marks: &[Mark]) -> Option<&Mark> {
    if marks.len() % 2 == 1 {
        marks.last()
    } else {
        None
    }
}

/// 区切り文字のない`HHmm`形式を`HH:mm`形式にそろえる。
fn normalize_clock(clock: &str) -> Result<String, ClockError> {
    if clock.contains(':') {
        Ok(clock.to_string())
    } else {
        format_clock_string(clock)
    }
}

/// `HH:mm`形式の文字列を時と分に分割する。
fn split_clock(clock: &str) -> Result<(i64, i64), ClockError> {
    let invalid = || ClockError::InvalidClockFormat(clock.to_string());
    let (hours, minutes) = clock.split_once(':').ok_or_else(invalid)?;
    let is_two_digits = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_digit());
    if !is_two_digits(hours) || !is_two_digits(minutes) {
        return Err(invalid());
    }

    Ok((
        hours.parse().map_err(|_| invalid())?,
        minutes.parse().map_err(|_| invalid())?,
    ))
}
