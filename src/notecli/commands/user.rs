use super::{CmdMessage, CmdResult, ListedCredential};
use crate::batch::{BatchFailure, BatchRequest};
use crate::credentials::CredentialRegistry;
use crate::error::{NoteError, Result};
use crate::model::CredentialKind;
use crate::store::LocalStore;

/// Options `user set` understands.
pub const SETTABLE_OPTIONS: &[(&str, &str)] = &[("credential", "<index>  activate a stored credential")];

pub fn add<S: LocalStore>(
    store: &mut S,
    name: &str,
    secret: &str,
    kind: CredentialKind,
) -> Result<CmdResult> {
    let mut registry = CredentialRegistry::new(store);
    let credential = registry.add(name, secret, kind)?;
    let index = registry.list_all()?.len();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Credential {} \"{}\" ({}) added",
        index, credential.name, credential.kind
    )));
    Ok(result)
}

pub fn list<S: LocalStore>(store: &mut S) -> Result<CmdResult> {
    let registry = CredentialRegistry::new(store);
    let active = registry.active()?.map(|c| c.name);
    let listed: Vec<_> = registry
        .list_all()?
        .into_iter()
        .enumerate()
        .map(|(pos, credential)| ListedCredential {
            index: pos + 1,
            active: active.as_deref() == Some(credential.name.as_str()),
            credential,
        })
        .collect();

    let mut result = CmdResult::default();
    if listed.is_empty() {
        result.add_message(CmdMessage::info(
            "No credentials stored. Add one with `notecli user add`.",
        ));
    }
    Ok(result.with_listed_credentials(listed))
}

pub fn remove<S: LocalStore, I: AsRef<str>>(store: &mut S, indexes: &[I]) -> Result<CmdResult> {
    let request = BatchRequest::parse(indexes);
    if request.indexes.is_empty() && request.rejected.is_empty() {
        return Err(NoteError::Validation("no credentials given".into()));
    }

    let mut registry = CredentialRegistry::new(store);
    let was_active = registry.active()?.map(|c| c.name);
    let outcome = registry.remove_batch(&request)?;

    let mut result = CmdResult::default();
    for removal in &outcome.removed {
        result.add_message(CmdMessage::success(format!(
            "Credential {} \"{}\" removed",
            removal.original, removal.entity.label
        )));
        if was_active.as_deref() == Some(removal.entity.label.as_str()) {
            result.add_message(CmdMessage::warning(
                "The active credential was removed; activate another with `notecli user set credential <index>`",
            ));
        }
    }
    for failure in &outcome.failures {
        result.add_message(match failure {
            BatchFailure::NotANumber(_) => CmdMessage::warning(failure.to_string()),
            _ => CmdMessage::error(failure.to_string()),
        });
    }
    Ok(result)
}

/// `user set <option> <value>`. Unknown options and missing values are
/// answered with the list of settable options.
pub fn set<S: LocalStore, I: AsRef<str>>(store: &mut S, args: &[I]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();

    match args.as_slice() {
        ["credential", value] => {
            let index = crate::index::parse_index(value).ok_or_else(|| {
                NoteError::Validation(format!("{} is not a number", value))
            })?;
            let settings = CredentialRegistry::new(store).activate_by_index(index)?;
            if let Some(credential) = settings.credential {
                result.add_message(CmdMessage::success(format!(
                    "Credential {} \"{}\" is now active",
                    index, credential.name
                )));
            }
        }
        _ => {
            result.add_message(CmdMessage::warning("Usage: notecli user set <option> <value>"));
            result.add_message(CmdMessage::info("Options:"));
            for (option, help) in SETTABLE_OPTIONS {
                result.add_message(CmdMessage::info(format!("  {} {}", option, help)));
            }
        }
    }
    Ok(result)
}

pub fn logout<S: LocalStore>(store: &mut S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match CredentialRegistry::new(store).logout()? {
        Some(previous) => result.add_message(CmdMessage::success(format!(
            "Logged out of \"{}\"",
            previous.name
        ))),
        None => result.add_message(CmdMessage::info("Not logged in")),
    }
    Ok(result)
}
