use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::clock::{calculate_worktime_day_resume, parse_duration, DayResume};
use crate::datetime;
use crate::portal::{MarksRepository, PortalCredentials};

/// 勤怠ポータルから打刻を取得して集計するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
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

    #[clap(short = 'u', long = "user", help = "User ID on the portal", env = "MW_USER")]
    pub user: Option<String>,

    #[clap(
        short = 'p',
        long = "password",
        help = "User password on the portal",
        env = "MW_PASS",
        hide_env_values = true
    )]
    pub password: Option<String>,

    #[clap(short = 'c', long = "company", help = "Company ID on the portal", env = "MW_COMPANY")]
    pub company: Option<String>,

    #[clap(long = "url", help = "Base URL of the portal API", env = "MW_PORTAL_URL")]
    pub url: Option<String>,
}

impl CheckArgs {
    /// 引数と環境変数から認証情報を組み立てる。
    ///
    /// 不足している項目がある場合は、設定方法を含むエラーを返す。
    pub fn credentials(&self) -> Result<PortalCredentials> {
        let required = |value: &Option<String>, flag: &str, env: &str| {
            value.clone().with_context(|| {
                format!(
                    "Could not retrieve the portal credentials: pass {} or set the environment variable {}",
                    flag, env
                )
            })
        };

        Ok(PortalCredentials {
            url: required(&self.url, "--url", "MW_PORTAL_URL")?,
            user: required(&self.user, "--user", "MW_USER")?,
            password: required(&self.password, "--password", "MW_PASS")?,
            company: required(&self.company, "--company", "MW_COMPANY")?,
        })
    }
}

pub struct CheckCommand<'a, T: MarksRepository> {
    repository: &'a T,
}

impl<'a, T: MarksRepository> CheckCommand<'a, T> {
    /// 新しい`CheckCommand`を返す。
    ///
    /// # Arguments
    /// * `repository` - 打刻を取得するためのリポジトリ
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// `check`サブコマンドの処理を行う。
    ///
    /// 指定された日付の打刻を取得し、1日のサマリーを計算する。
    /// 日付が指定されていない場合は、Localタイムゾーンで現在の日付を利用する。
    /// 当日の場合のみ、現在時刻までの労働時間を計算する。
    ///
    /// # Arguments
    ///
    /// * `check` - `check`サブコマンドの引数
    pub async fn run(&self, check: &CheckArgs) -> Result<(NaiveDate, DayResume)> {
        let journey_target_minutes = parse_duration(&check.journey)
            .with_context(|| format!("Failed to parse journey: {}", check.journey))?;
        let now = datetime::now();
        let date = check.date.unwrap_or_else(|| now.date_naive());
        info!("Date: {}, Journey: {} minutes", date, journey_target_minutes);

        let marks = self
            .repository
            .read_marks(&date)
            .await
            .context("Failed to retrieve marks")?;
        info!("Marks retrieved successfully.");

        let now_minutes = (date == now.date_naive()).then(|| datetime::minute_of_day(&now));
        let resume = calculate_worktime_day_resume(&marks, journey_target_minutes, now_minutes);

        Ok((date, resume))
    }
}

/// 日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}
