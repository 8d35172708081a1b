// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Handles invoking external binaries.
// Each binary is looked up once, in a fixed list of directories. The binary
// may be uninstalled while the process runs, so its existence is checked
// again before each invocation and an explicit error is returned if it is
// gone.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use once_cell::sync::Lazy;

use crate::{
    consts::BINARIES_PATHS,
    core::{DmName, DmUuid},
    result::{DmError, DmResult, ErrorEnum},
};

// These are the external binaries that this crate relies on.
// Any change in this list requires a corresponding change to BINARIES,
// and vice-versa.
const DMSETUP: &str = "dmsetup";
const DMRAID: &str = "dmraid";

/// Find the binary with the given name by looking in likely locations.
/// Return None if no binary was found.
fn find_binary(name: &str) -> Option<PathBuf> {
    BINARIES_PATHS
        .iter()
        .map(|pre| [pre, name].iter().collect::<PathBuf>())
        .find(|path| path.exists())
}

static BINARIES: Lazy<HashMap<String, Option<PathBuf>>> = Lazy::new(|| {
    [DMSETUP, DMRAID]
        .iter()
        .map(|name| (name.to_string(), find_binary(name)))
        .collect()
});

/// Verify that all binaries that this crate might invoke are available at
/// some path. Return an error naming every missing binary.
pub fn verify_binaries() -> DmResult<()> {
    let mut missing: Vec<&str> = BINARIES
        .iter()
        .filter(|(_, path)| path.is_none())
        .map(|(name, _)| name.as_str())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        missing.sort_unstable();
        Err(DmError::Dm(
            ErrorEnum::NotFound,
            format!(
                "executables {} not found in any of {}",
                missing.join(", "),
                BINARIES_PATHS.join(", ")
            ),
        ))
    }
}

/// Get an absolute path for the executable with the given name.
fn get_executable(name: &str) -> DmResult<&'static Path> {
    match BINARIES.get(name).and_then(|path| path.as_deref()) {
        Some(path) if path.exists() => Ok(path),
        _ => Err(DmError::Dm(
            ErrorEnum::NotFound,
            format!(
                "executable {name} not found in any of {}",
                BINARIES_PATHS.join(", ")
            ),
        )),
    }
}

/// Invoke the specified command and return its output, whether or not the
/// command succeeded. Return an error only if the command could not be run.
fn run_cmd(cmd: &mut Command) -> DmResult<Output> {
    debug!("Executing {cmd:?}");
    cmd.output().map_err(|err| {
        DmError::Dm(
            ErrorEnum::Error,
            format!("failed to execute command {cmd:?}: {err}"),
        )
    })
}

/// Invoke the specified command. Return an error if invoking the command
/// fails or if the command itself fails.
fn execute_cmd(cmd: &mut Command) -> DmResult<Output> {
    let output = run_cmd(cmd)?;
    if output.status.success() {
        Ok(output)
    } else {
        Err(DmError::Dm(
            ErrorEnum::Error,
            format!(
                "command {cmd:?} failed with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ))
    }
}

/// Create a map named name, loaded with table, and activate it.
pub fn dmsetup_create(name: &DmName, table: &str, uuid: Option<&DmUuid>) -> DmResult<()> {
    let mut cmd = Command::new(get_executable(DMSETUP)?);
    cmd.arg("create").arg(name.as_str()).arg("--table").arg(table);
    if let Some(uuid) = uuid {
        cmd.arg("-u").arg(uuid.as_str());
    }
    execute_cmd(&mut cmd).map(|_| ())
}

/// Remove the map named name.
pub fn dmsetup_remove(name: &DmName) -> DmResult<()> {
    execute_cmd(
        Command::new(get_executable(DMSETUP)?)
            .arg("remove")
            .arg(name.as_str()),
    )
    .map(|_| ())
}

/// List all discovered RAID sets, their subsets and member devices in
/// dmraid's colon-separated format.
///
/// dmraid exits non-zero when there is nothing to list, so the output is
/// returned regardless of the exit status.
pub fn dmraid_list_sets() -> DmResult<Output> {
    run_cmd(
        Command::new(get_executable(DMRAID)?)
            .arg("-s")
            .arg("-c")
            .arg("-c")
            .arg("-c"),
    )
}

/// Suspend or resume the map named name.
#[cfg(test)]
pub fn dmsetup_suspend(name: &DmName, suspend: bool) -> DmResult<()> {
    execute_cmd(
        Command::new(get_executable(DMSETUP)?)
            .arg(if suspend { "suspend" } else { "resume" })
            .arg(name.as_str()),
    )
    .map(|_| ())
}
