use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

mod calc_command;
mod check_command;
mod clock;
mod console;
mod datetime;
mod error;
mod portal;

use calc_command::{calc_command, CalcArgs};
use check_command::{CheckArgs, CheckCommand};
use console::{ConsoleMarkdownList, ConsolePresenter};
use portal::PortalClient;

/// 打刻から労働時間と退勤予定時刻を計算するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- check -u 321 -p 123 -c a22 --url https://portal.example.com/api
/// $ cargo run -- calc 09:00,12:00,13:00 -j 08:48
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(subcommand)]
    subcommand: SubCommands,

    #[clap(
        short = 'b',
        long = "debug",
        global = true,
        help = "Shows more information while running"
    )]
    debug: bool,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Fetches the marks of a day from the portal and calculates the worked time
    Check(CheckArgs),
    /// Calculates the worked time and the time to leave for the given marks
    #[clap(alias = "punch")]
    Calc(CalcArgs),
}

/// ログの出力先と書式を設定する。
fn setup_logger(level: LevelFilter) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
        .context("Failed to initialize logger")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    setup_logger(level)?;

    let (date, resume) = match args.subcommand {
        SubCommands::Check(check) => {
            let client = PortalClient::new(check.credentials()?);
            CheckCommand::new(&client).run(&check).await?
        }
        SubCommands::Calc(calc) => calc_command(&calc)?,
    };

    let mut stdout = io::stdout().lock();
    ConsoleMarkdownList::new(&mut stdout).show_day_resume(&date, &resume)?;

    Ok(())
}
