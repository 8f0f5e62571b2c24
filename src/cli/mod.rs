//! `demand` command line.
//!
//! Each invocation loads the registry snapshot from `--state`, applies one
//! operation and writes the snapshot back, so consecutive commands behave
//! like consecutive transactions against the same registry.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::info;
use solana_sdk::pubkey::Pubkey;

use crate::common::config::{get_deploy_config, DeployConfig, EnvSecrets};
use crate::positions::{NewPosition, PositionRegistry, RegistrySnapshot, Role};

#[derive(Parser, Debug)]
#[command(name = "demand", version, about = "Role-gated military position registry")]
pub struct Cli {
    /// Registry snapshot file.
    #[arg(long, global = true, default_value = "demand-state.json")]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a fresh registry owned by `--owner` (or the PRIVATE_KEY deployer).
    Deploy {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        owner: Option<Pubkey>,
        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
    },
    /// Grant a role to one or more accounts.
    AssignRole {
        #[arg(long)]
        from: Pubkey,
        #[arg(long)]
        role: Role,
        #[arg(required = true)]
        accounts: Vec<Pubkey>,
    },
    /// Create a position record.
    CreatePosition {
        #[arg(long)]
        from: Pubkey,
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Print a position record as JSON.
    Position { id: u64 },
    /// Print registry name, symbol and owner.
    Owner,
    /// List holders of a role.
    Members { role: Role },
    /// Print the event journal.
    Events {
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
    /// Print the resolved deployment networks.
    Networks {
        /// TOML config file; defaults to DEMAND_CONFIG_TOML.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    #[arg(long)]
    pub number: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub low_rank: u32,
    #[arg(long)]
    pub high_rank: u32,
    #[arg(long)]
    pub trade: u32,
    #[arg(long, default_value_t = 0)]
    pub environment: u8,
    #[arg(long, default_value_t = 0)]
    pub task_list: u64,
    #[arg(long, default_value_t = 0)]
    pub current_soldier: u64,
    #[arg(long)]
    pub organization: Pubkey,
    #[arg(long, default_value_t = 0)]
    pub status: u8,
    #[arg(long, default_value_t = 0)]
    pub component: u8,
}

impl From<PositionArgs> for NewPosition {
    fn from(args: PositionArgs) -> Self {
        NewPosition {
            position_number: args.number,
            position_name: args.name,
            low_rank: args.low_rank,
            high_rank: args.high_rank,
            trade: args.trade,
            environment: args.environment,
            task_list: args.task_list,
            current_soldier: args.current_soldier,
            owning_organization: args.organization,
            status: args.status,
            component: args.component,
        }
    }
}

fn load(path: &Path) -> Result<PositionRegistry> {
    let snapshot = RegistrySnapshot::load_json(path)
        .context("no registry here yet; run `demand deploy` first")?;
    Ok(PositionRegistry::from_snapshot(snapshot)?)
}

fn store(registry: &PositionRegistry, path: &Path) -> Result<()> {
    registry.snapshot()?.save_json(path)
}

pub fn run(cli: Cli) -> Result<()> {
    let state = cli.state.as_path();

    match cli.command {
        Command::Deploy {
            name,
            symbol,
            owner,
            force,
        } => {
            if state.exists() && !force {
                bail!("{} already exists; pass --force to replace it", state.display());
            }
            let owner = match owner {
                Some(key) => key,
                None => EnvSecrets::from_env().deployer_pubkey()?,
            };
            let registry = PositionRegistry::new(name, symbol, owner);
            store(&registry, state)?;
            println!(
                "{} {} ({}) owner={}",
                "deployed".green(),
                registry.name(),
                registry.symbol(),
                registry.owner()
            );
        }
        Command::AssignRole {
            from,
            role,
            accounts,
        } => {
            let registry = load(state)?;
            let granted = registry.assign_role(&from, role, &accounts)?;
            store(&registry, state)?;
            println!(
                "{} {} to {} new account(s)",
                "granted".green(),
                role,
                granted
            );
        }
        Command::CreatePosition { from, position } => {
            let registry = load(state)?;
            let position_id = registry.create_position(&from, position.into())?;
            store(&registry, state)?;
            println!("{} positionId={}", "created".green(), position_id);
        }
        Command::Position { id } => {
            let registry = load(state)?;
            let position = registry.get_position_details(id)?;
            println!("{}", serde_json::to_string_pretty(&position)?);
        }
        Command::Owner => {
            let registry = load(state)?;
            println!(
                "{} ({}) owner={}",
                registry.name(),
                registry.symbol(),
                registry.owner()
            );
        }
        Command::Members { role } => {
            let registry = load(state)?;
            for account in registry.members(role) {
                println!("{}", account);
            }
        }
        Command::Events { since } => {
            let registry = load(state)?;
            for event in registry.events_since(since) {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        Command::Networks { config } => {
            let cfg = match config {
                Some(path) => DeployConfig::from_file(path)?.with_secrets(&EnvSecrets::from_env()),
                None => get_deploy_config().clone(),
            };
            info!("Default network: {}", cfg.default_network);
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assign_role_batch() {
        let from = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let from_s = from.to_string();
        let a_s = a.to_string();
        let b_s = b.to_string();

        let cli = Cli::try_parse_from([
            "demand",
            "assign-role",
            "--from",
            from_s.as_str(),
            "--role",
            "unit-position-manager",
            a_s.as_str(),
            b_s.as_str(),
        ])
        .unwrap();

        match cli.command {
            Command::AssignRole {
                from: parsed_from,
                role,
                accounts,
            } => {
                assert_eq!(parsed_from, from);
                assert_eq!(role, Role::UnitPositionManager);
                assert_eq!(accounts, vec![a, b]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn create_position_defaults_enum_codes_to_zero() {
        let org = Pubkey::new_unique().to_string();
        let from = Pubkey::new_unique().to_string();
        let cli = Cli::try_parse_from([
            "demand",
            "create-position",
            "--from",
            from.as_str(),
            "--number",
            "123456",
            "--name",
            "OpsO",
            "--low-rank",
            "24",
            "--high-rank",
            "26",
            "--trade",
            "56",
            "--organization",
            org.as_str(),
        ])
        .unwrap();

        let Command::CreatePosition { position, .. } = cli.command else {
            panic!("expected create-position");
        };
        let new: NewPosition = position.into();
        assert_eq!(new.position_name, "OpsO");
        assert_eq!(new.environment, 0);
        assert_eq!(new.status, 0);
        assert_eq!(new.component, 0);
    }

    #[test]
    fn deploy_then_mutate_through_state_file() {
        let path = std::env::temp_dir().join(format!("demand-cli-{}.json", Pubkey::new_unique()));
        let owner = Pubkey::new_unique();
        let admin = Pubkey::new_unique();
        let state = path.to_string_lossy().to_string();
        let owner_s = owner.to_string();
        let admin_s = admin.to_string();
        let (state, owner_s, admin_s) = (state.as_str(), owner_s.as_str(), admin_s.as_str());

        let deploy = Cli::try_parse_from([
            "demand", "--state", state, "deploy", "--name", "CAFChain", "--symbol", "CAF",
            "--owner", owner_s,
        ])
        .unwrap();
        run(deploy).unwrap();

        let grant = Cli::try_parse_from([
            "demand", "--state", state, "assign-role", "--from", owner_s, "--role",
            "administrator", admin_s,
        ])
        .unwrap();
        run(grant).unwrap();

        // redeploy without --force refuses to clobber
        let again = Cli::try_parse_from([
            "demand", "--state", state, "deploy", "--name", "X", "--symbol", "X", "--owner",
            owner_s,
        ])
        .unwrap();
        assert!(run(again).is_err());

        let registry = load(&path).unwrap();
        assert_eq!(registry.owner(), owner);
        assert!(registry.has_role(&admin, Role::Administrator));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejected_commands_leave_state_file_untouched() {
        let path = std::env::temp_dir().join(format!("demand-cli-{}.json", Pubkey::new_unique()));
        let owner = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();
        let state = path.to_string_lossy().to_string();
        let owner_s = owner.to_string();
        let stranger_s = stranger.to_string();
        let (state, owner_s, stranger_s) = (state.as_str(), owner_s.as_str(), stranger_s.as_str());

        run(Cli::try_parse_from([
            "demand", "--state", state, "deploy", "--name", "CAFChain", "--symbol", "CAF",
            "--owner", owner_s,
        ])
        .unwrap())
        .unwrap();
        run(Cli::try_parse_from([
            "demand", "--state", state, "create-position", "--from", owner_s, "--number",
            "123456", "--name", "OpsO", "--low-rank", "24", "--high-rank", "26", "--trade", "56",
            "--organization", owner_s,
        ])
        .unwrap())
        .unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let create = Cli::try_parse_from([
            "demand", "--state", state, "create-position", "--from", stranger_s, "--number",
            "654321", "--name", "G3", "--low-rank", "24", "--high-rank", "26", "--trade", "56",
            "--organization", owner_s,
        ])
        .unwrap();
        assert!(run(create).is_err());

        let grant = Cli::try_parse_from([
            "demand", "--state", state, "assign-role", "--from", stranger_s, "--role",
            "administrator", stranger_s,
        ])
        .unwrap();
        assert!(run(grant).is_err());

        let owner_grant = Cli::try_parse_from([
            "demand", "--state", state, "assign-role", "--from", owner_s, "--role", "owner",
            stranger_s,
        ])
        .unwrap();
        assert!(run(owner_grant).is_err());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        let registry = load(&path).unwrap();
        assert_eq!(registry.position_count(), 1);
        assert_eq!(registry.events().len(), 1);
        assert_eq!(registry.members(Role::Owner), vec![owner]);
        assert!(!registry.has_role(&stranger, Role::Administrator));

        std::fs::remove_file(&path).ok();
    }
}
