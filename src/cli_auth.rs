use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use music_inventory_server::file_auth_store::FileAuthStore;
use music_inventory_server::server::auth::{AuthManager, UserId, UserRole};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s).canonicalize()?;
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_role(s: &str) -> Result<UserRole> {
    UserRole::from_str(s).with_context(|| format!("Unknown role: {}", s))
}

#[derive(Parser, Debug)]
struct CliArgs {
    #[clap(value_parser = parse_path)]
    pub path: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Creates password credentials for the given user id.
    /// Fails if the user already has a password set.
    AddLogin {
        user_id: UserId,
        password: String,
        #[clap(value_parser = parse_role, default_value = "regular")]
        role: UserRole,
    },

    /// Change the password of a user, fails if no password was set.
    UpdateLogin { user_id: UserId, password: String },

    /// Deletes the password credentials of a given user.
    DeleteLogin { user_id: UserId },

    /// Changes the role of a given user.
    SetRole {
        user_id: UserId,
        #[clap(value_parser = parse_role)]
        role: UserRole,
    },

    /// Lists all users with credentials and their roles.
    Show,

    Exit,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let auth_store_file_path = match cli_args.path {
        Some(path) => path,
        None => FileAuthStore::infer_path()
            .with_context(|| "Could not infer auth store file path, please specify it explicitly.")?,
    };
    let auth_store = FileAuthStore::initialize(auth_store_file_path);
    let mut auth_manager = AuthManager::initialize(Box::new(auth_store))?;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        reader.read_line(&mut line).context("Failed to read line")?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        let args = shlex::split(line)
            .unwrap_or_else(|| line.split_whitespace().map(String::from).collect());
        let cli =
            InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

        match cli {
            Ok(cli) => match cli.command {
                InnerCommand::AddLogin {
                    user_id,
                    password,
                    role,
                } => {
                    if let Err(err) =
                        auth_manager.create_password_credentials(&user_id, password, role)
                    {
                        eprintln!("Something went wrong: {}", err);
                        continue;
                    }
                }
                InnerCommand::UpdateLogin { user_id, password } => {
                    if let Err(err) = auth_manager.update_password_credentials(&user_id, password) {
                        eprintln!("Something went wrong: {}", err);
                        continue;
                    }
                }
                InnerCommand::DeleteLogin { user_id } => {
                    if let Err(err) = auth_manager.delete_password_credentials(&user_id) {
                        eprintln!("Something went wrong: {}", err);
                        continue;
                    }
                }
                InnerCommand::SetRole { user_id, role } => {
                    if let Err(err) = auth_manager.set_role(&user_id, role) {
                        eprintln!("Something went wrong: {}", err);
                        continue;
                    }
                }
                InnerCommand::Show => {
                    for (user_id, role) in auth_manager.list_users() {
                        println!("{} ({})", user_id, role.as_str());
                    }
                }
                InnerCommand::Exit => break,
            },
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        }
        println!("Done.");
    }
    Ok(())
}
