// src/bin/promote_admin.rs
// DOCUMENTATION: Grant or revoke admin rights from the command line
// USAGE: promote-admin <email> [--revoke]

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use fragrance_hub::config::{init_db_pool, Config};
use fragrance_hub::db::{run_migrations, UserRepository};
use std::env;
use std::process;

// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

#[derive(Debug, PartialEq)]
struct Args {
    email: String,
    revoke: bool,
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut email = None;
    let mut revoke = false;

    for arg in raw {
        match arg.as_str() {
            "--revoke" => revoke = true,
            flag if flag.starts_with("--") => bail!("unknown flag: {}", flag),
            value if email.is_none() => email = Some(value.trim().to_lowercase()),
            value => bail!("unexpected argument: {}", value),
        }
    }

    match email {
        Some(email) if !email.is_empty() => Ok(Args { email, revoke }),
        _ => bail!("missing <email> argument"),
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_env();

    let pool = init_db_pool(&config)
        .await
        .with_context(|| format!("cannot open database {}", config.database_url))?;
    run_migrations(&pool).await.context("migrations failed")?;

    let user = UserRepository::find_by_email(&pool, &args.email)
        .await?
        .with_context(|| format!("no user registered with {}", args.email))?;

    if user.is_admin != args.revoke {
        let state = if user.is_admin { "already an admin" } else { "not an admin" };
        println!("{}{} is {}; nothing to do{}", YELLOW, user.username, state, RESET);
        return Ok(());
    }

    UserRepository::set_admin(&pool, user.id, !args.revoke).await?;

    let action = if args.revoke { "revoked from" } else { "granted to" };
    println!(
        "{}{}✔ Admin rights {} {} ({}){}",
        GREEN, BOLD, action, user.username, user.email, RESET
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}Error:{} {}", RED, RESET, e);
            eprintln!("{}Usage:{} promote-admin <email> [--revoke]", CYAN, RESET);
            process::exit(2);
        }
    };

    if let Err(e) = run(args).await {
        eprintln!("{}Error:{} {:#}", RED, RESET, e);
        process::exit(1);
    }
}
