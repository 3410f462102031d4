//! portal-cli: headless runner for the banking portal.
//!
//! Usage:
//!   portal-cli --user amit --password password --role customer
//!   portal-cli --user amit --password password --list transactions --account 1002
//!   portal-cli --backend sqlite --user rajesh --password password --role employee \
//!              --list accounts --search Mumbai --query "SELECT * FROM loan"
//!   portal-cli --config portal.json --ipc-mode

use anyhow::Result;
use bankportal_core::{
    clock::PortalClock,
    config::{Backend, PortalConfig},
    error::PortalError,
    portal::{Portal, QueryHistory},
    session::{Credentials, Role, Session},
    types::{AccountNo, Timestamp, TIMESTAMP_FORMAT},
};
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Login {
        username: String,
        password: String,
        role:     Role,
    },
    Logout,
    Dashboard,
    ListAccounts {
        #[serde(default)]
        search: String,
    },
    ListLoans,
    ListTransactions {
        account_no: Option<AccountNo>,
        #[serde(default)]
        search:     String,
    },
    ListUsers {
        #[serde(default)]
        search: String,
    },
    ListEmployees {
        #[serde(default)]
        search: String,
    },
    Query {
        text: String,
    },
    History,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match flag(&args, "--config") {
        Some(path) => PortalConfig::load(path)?,
        None => PortalConfig::default(),
    };
    if let Some(raw) = flag(&args, "--backend") {
        config.backend = raw.parse::<Backend>()?;
    }
    if let Some(db) = flag(&args, "--db") {
        config.database = db.to_string();
    }
    if let Some(raw) = flag(&args, "--now") {
        let at = Timestamp::parse_from_str(raw, TIMESTAMP_FORMAT)
            .map_err(|e| anyhow::anyhow!("Bad --now '{raw}': {e}"))?;
        config.clock = PortalClock::fixed(at);
    }
    if let Some(ms) = parse_arg::<u64>(&args, "--latency-ms")? {
        config.latency_ms = Some(ms);
    }
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let portal = Portal::from_config(&config)?;

    if ipc_mode {
        run_ipc_loop(&portal)
    } else {
        run_once(&portal, &args)
    }
}

// ── One-shot mode ──────────────────────────────────────────────

fn run_once(portal: &Portal, args: &[String]) -> Result<()> {
    let (Some(username), Some(password)) = (flag(args, "--user"), flag(args, "--password")) else {
        anyhow::bail!("--user and --password are required outside --ipc-mode");
    };
    let role: Role = flag(args, "--role").unwrap_or("customer").parse()?;
    let session = portal.login(&Credentials {
        username: username.to_string(),
        password: password.to_string(),
        role,
    })?;

    println!("Banking portal ({})", portal.service().name());
    println!("  signed in as: {} ({})", session.name, session.role());
    println!();

    print_json("dashboard", &dashboard(portal, &session)?)?;

    let search = flag(args, "--search").unwrap_or("");
    let account_no = parse_arg::<AccountNo>(args, "--account")?;
    if let Some(list) = flag(args, "--list") {
        print_json(list, &listing(portal, &session, list, account_no, search)?)?;
    } else if role == Role::Employee && !search.is_empty() {
        print_json("accounts", &listing(portal, &session, "accounts", None, search)?)?;
    }

    if let Some(text) = flag(args, "--query") {
        print_json("query", &serde_json::to_value(portal.console(&session, text)?)?)?;
    }

    portal.logout(session);
    Ok(())
}

fn print_json(title: &str, value: &Value) -> Result<()> {
    println!("=== {} ===", title.to_uppercase());
    println!("{}", serde_json::to_string_pretty(value)?);
    println!();
    Ok(())
}

// ── IPC mode ───────────────────────────────────────────────────

fn run_ipc_loop(portal: &Portal) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut session: Option<Session> = None;
    let mut history = QueryHistory::default();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let reply = match handle_command(portal, &mut session, &mut history, cmd) {
            Ok(value) => value,
            Err(e) => json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }

    if let Some(open) = session.take() {
        portal.logout(open);
    }
    Ok(())
}

fn handle_command(
    portal: &Portal,
    session: &mut Option<Session>,
    history: &mut QueryHistory,
    cmd: IpcCommand,
) -> Result<Value> {
    match cmd {
        IpcCommand::Login { username, password, role } => {
            if let Some(previous) = session.take() {
                portal.logout(previous);
            }
            history.clear();
            let fresh = portal.login(&Credentials { username, password, role })?;
            let reply = serde_json::to_value(&fresh)?;
            *session = Some(fresh);
            Ok(reply)
        }
        IpcCommand::Logout => {
            let previous = session.take().ok_or(PortalError::NotAuthenticated)?;
            portal.logout(previous);
            history.clear();
            Ok(json!({ "ok": true }))
        }
        IpcCommand::Dashboard => dashboard(portal, signed_in(session)?),
        IpcCommand::ListAccounts { search } => {
            listing(portal, signed_in(session)?, "accounts", None, &search)
        }
        IpcCommand::ListLoans => listing(portal, signed_in(session)?, "loans", None, ""),
        IpcCommand::ListTransactions { account_no, search } => {
            listing(portal, signed_in(session)?, "transactions", account_no, &search)
        }
        IpcCommand::ListUsers { search } => {
            listing(portal, signed_in(session)?, "users", None, &search)
        }
        IpcCommand::ListEmployees { search } => {
            listing(portal, signed_in(session)?, "employees", None, &search)
        }
        IpcCommand::Query { text } => {
            let rows = portal.console_recorded(signed_in(session)?, &text, history)?;
            Ok(json!({ "rows": rows, "history": history.entries() }))
        }
        IpcCommand::History => {
            Ok(json!({ "history": portal.console_history(signed_in(session)?, history)? }))
        }
        IpcCommand::Quit => Ok(json!({ "ok": true })),
    }
}

fn signed_in(session: &Option<Session>) -> Result<&Session, PortalError> {
    session.as_ref().ok_or(PortalError::NotAuthenticated)
}

// ── Shared views ───────────────────────────────────────────────

fn dashboard(portal: &Portal, session: &Session) -> Result<Value> {
    Ok(match session.role() {
        Role::Customer => serde_json::to_value(portal.customer_dashboard(session)?)?,
        Role::Employee => serde_json::to_value(portal.employee_dashboard(session)?)?,
    })
}

/// One listing screen for the session's role. Customers see their own
/// records; employees see everything, narrowed by `search`.
fn listing(
    portal: &Portal,
    session: &Session,
    list: &str,
    account_no: Option<AccountNo>,
    search: &str,
) -> Result<Value> {
    let value = match (session.role(), list) {
        (Role::Customer, "accounts") => serde_json::to_value(portal.customer_accounts(session)?)?,
        (Role::Customer, "loans") => serde_json::to_value(portal.customer_loans(session)?)?,
        (Role::Customer, "transactions") => {
            serde_json::to_value(portal.customer_activity(session, account_no)?)?
        }
        (Role::Employee, "accounts") => {
            serde_json::to_value(portal.search_accounts(session, search)?)?
        }
        (Role::Employee, "transactions") => {
            serde_json::to_value(portal.search_transactions(session, search)?)?
        }
        (Role::Employee, "users") => serde_json::to_value(portal.search_users(session, search)?)?,
        (Role::Employee, "loans") => serde_json::to_value(portal.search_loans(session, search)?)?,
        (Role::Employee, "employees") => {
            serde_json::to_value(portal.search_employees(session, search)?)?
        }
        (role, other) => {
            log::warn!("unknown listing '{other}' for {role}");
            anyhow::bail!("No '{other}' listing for the {role} role");
        }
    };
    Ok(value)
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == name).map(|w| w[1].as_str())
}

/// A flag's value parsed as `T`. A value that does not parse is an error,
/// never a silent default.
fn parse_arg<T>(args: &[String], name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    flag(args, name)
        .map(|raw| raw.parse::<T>().map_err(|e| anyhow::anyhow!("Bad {name} '{raw}': {e}")))
        .transpose()
}
