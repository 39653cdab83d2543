//! Application context for the Ephemera CLI.
//!
//! Provides a unified context that combines CLI arguments with lazily-loaded
//! configuration, storage and the signed-in account.

use std::sync::Arc;

use once_cell::unsync::OnceCell;

use ephemera_core::storage::Account;
use ephemera_core::{AccountService, Caller, NoteCipher, NoteService, SqliteStore};

use crate::cli::Cli;
use crate::config::EphemeraConfig;
use crate::constants::ENV_PASSWORD;
use crate::errors::CliError;
use crate::helpers::read_secret;

use super::key::load_server_key;
use super::resolver::{load_config, missing_database_message, resolve_database_path};

/// Application context that bundles CLI args with everything derived from them.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<EphemeraConfig>>,
    cipher: OnceCell<Arc<NoteCipher>>,
    store: OnceCell<Arc<SqliteStore>>,
    account: OnceCell<Option<Account>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            cipher: OnceCell::new(),
            store: OnceCell::new(),
            account: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, or `None` if there is none yet.
    pub fn config(&self) -> anyhow::Result<Option<&EphemeraConfig>> {
        Ok(self.config.get_or_try_init(load_config)?.as_ref())
    }

    /// The note cipher built from the resolved server key.
    pub fn cipher(&self) -> anyhow::Result<Arc<NoteCipher>> {
        let cipher = self.cipher.get_or_try_init(|| {
            let key = load_server_key(self.config()?)?;
            Ok::<_, anyhow::Error>(Arc::new(NoteCipher::new(&key)))
        })?;
        Ok(Arc::clone(cipher))
    }

    /// Open the note database. It must already exist.
    pub fn store(&self) -> anyhow::Result<Arc<SqliteStore>> {
        let store = self.store.get_or_try_init(|| {
            let path = resolve_database_path(self.cli, self.config()?)?;
            if !path.exists() {
                return Err(CliError::not_found(
                    missing_database_message(&path),
                    "Run `ephemera init` to create it.",
                )
                .into());
            }
            Ok::<_, anyhow::Error>(Arc::new(SqliteStore::open(&path)?))
        })?;
        Ok(Arc::clone(store))
    }

    /// The note engine. The server key is resolved before the database is opened.
    pub fn notes(&self) -> anyhow::Result<NoteService<Arc<SqliteStore>>> {
        let cipher = self.cipher()?;
        Ok(NoteService::new(self.store()?, cipher))
    }

    pub fn accounts(&self) -> anyhow::Result<AccountService<Arc<SqliteStore>>> {
        Ok(AccountService::new(self.store()?))
    }

    /// The account named by `--user`, authenticated once per invocation.
    pub fn account(&self) -> anyhow::Result<Option<&Account>> {
        let account = self.account.get_or_try_init(|| {
            let Some(email) = self.cli.user.as_deref() else {
                return Ok::<_, anyhow::Error>(None);
            };
            let password = read_secret(ENV_PASSWORD, &format!("Password for {}", email))?;
            Ok(Some(self.accounts()?.authenticate(email, &password)?))
        })?;
        Ok(account.as_ref())
    }

    /// The account named by `--user`; an error when there is none.
    pub fn require_account(&self) -> anyhow::Result<&Account> {
        self.account()?.ok_or_else(|| {
            CliError::invalid_input("This command requires --user <EMAIL>").into()
        })
    }

    /// Who the request is made as.
    pub fn caller(&self) -> anyhow::Result<Caller> {
        Ok(match self.account()? {
            Some(account) => Caller::Account(account.id),
            None => Caller::Guest,
        })
    }
}
