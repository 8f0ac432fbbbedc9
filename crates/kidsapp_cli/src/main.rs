//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `kidsapp_core` linkage.
//! - Optionally dump the users stored in an existing database file.
//!
//! Usage: `kidsapp_cli [db_path]`

use kidsapp_core::{StoreConfig, User, UserRepository};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("kidsapp_core ping={}", kidsapp_core::ping());
    println!("kidsapp_core version={}", kidsapp_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match dump_users(Path::new(&db_path)) {
        Ok(users) => {
            println!("users={}", users.len());
            for user in users {
                println!(
                    "id={} name={} age={}",
                    user.id.unwrap_or_default(),
                    user.name,
                    user.age
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error={err}");
            ExitCode::FAILURE
        }
    }
}

/// Reads every user from the database at `db_path`.
///
/// Opening a store creates the file, so a mistyped path is rejected up front
/// instead of reporting an empty fresh database.
fn dump_users(db_path: &Path) -> Result<Vec<User>, String> {
    if !db_path.is_file() {
        return Err(format!("database file not found: {}", db_path.display()));
    }

    UserRepository::open(&StoreConfig::file(db_path))
        .and_then(|repository| repository.list_users().wait())
        .map_err(|err| err.to_string())
}
