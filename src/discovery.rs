// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Discovery of firmware RAID sets from on-disk metadata.

use std::{iter::Peekable, path::PathBuf, process::ExitStatus, vec};

use crate::{
    cmd::dmraid_list_sets,
    raidset::{RaidMember, RaidSet},
    result::{DmError, DmResult, ErrorEnum},
};

/// A source of RAID set forests. Each call discovers afresh.
pub trait RaidDiscovery {
    /// Discover all RAID sets, in discovery order.
    ///
    /// Failure to discover is `DiscoveryFailed`; finding no RAID devices at
    /// all is `NoCandidates`.
    fn discover(&self) -> DmResult<Vec<RaidSet>>;
}

/// Discover RAID sets by running dmraid.
#[derive(Debug, Default, Clone, Copy)]
pub struct DmraidDiscovery;

impl DmraidDiscovery {
    /// Make a new discovery source.
    pub fn new() -> DmraidDiscovery {
        DmraidDiscovery
    }
}

/// dmraid's messages when there is nothing to report.
const NOTHING_FOUND: [&str; 2] = ["no raid disks", "no raid sets"];

impl RaidDiscovery for DmraidDiscovery {
    fn discover(&self) -> DmResult<Vec<RaidSet>> {
        let output = dmraid_list_sets()
            .map_err(|err| DmError::Dm(ErrorEnum::DiscoveryFailed, err.to_string()))?;
        classify_dmraid_output(
            output.status,
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )
    }
}

/// Interpret a run of `dmraid -s -c -c -c`.
///
/// A report that there is nothing to find is `NoCandidates`, whatever the
/// exit status; so is a successful run that lists no sets. Any other
/// failed run is `DiscoveryFailed`.
fn classify_dmraid_output(
    status: ExitStatus,
    stdout: &str,
    stderr: &str,
) -> DmResult<Vec<RaidSet>> {
    let reported = format!("{stdout}\n{stderr}").to_lowercase();
    if NOTHING_FOUND.iter().any(|msg| reported.contains(msg)) {
        return Err(DmError::Dm(
            ErrorEnum::NoCandidates,
            "dmraid discovered no RAID devices".into(),
        ));
    }
    if !status.success() {
        return Err(DmError::Dm(
            ErrorEnum::DiscoveryFailed,
            format!("dmraid failed with {status}: {}", stderr.trim()),
        ));
    }

    let forest = parse_dmraid_sets(stdout)?;
    if forest.is_empty() {
        return Err(DmError::Dm(
            ErrorEnum::NoCandidates,
            "dmraid discovered no RAID sets".into(),
        ));
    }
    Ok(forest)
}

#[derive(Debug)]
enum Record {
    Set {
        name: String,
        kind: String,
        subsets: usize,
    },
    Member {
        path: PathBuf,
    },
}

fn parse_error(line: &str, reason: &str) -> DmError {
    DmError::Dm(
        ErrorEnum::DiscoveryFailed,
        format!("unparsable dmraid output line \"{line}\": {reason}"),
    )
}

fn parse_record(line: &str) -> DmResult<Record> {
    let fields = line.split(':').collect::<Vec<_>>();
    if line.starts_with('/') {
        // path:format:set:type:status:sectors:offset
        if fields.len() < 7 {
            return Err(parse_error(line, "too few fields for a member device"));
        }
        Ok(Record::Member {
            path: PathBuf::from(fields[0]),
        })
    } else {
        // name:size:stride:type:status:subsets:devs:spares
        if fields.len() < 8 {
            return Err(parse_error(line, "too few fields for a RAID set"));
        }
        if fields[0].is_empty() {
            return Err(parse_error(line, "empty set name"));
        }
        let subsets = fields[5]
            .trim()
            .parse::<usize>()
            .map_err(|_| parse_error(line, "subset count is not a number"))?;
        Ok(Record::Set {
            name: fields[0].to_string(),
            kind: fields[3].to_string(),
            subsets,
        })
    }
}

fn build_set(
    name: String,
    kind: &str,
    subsets: usize,
    records: &mut Peekable<vec::IntoIter<Record>>,
) -> DmResult<RaidSet> {
    if subsets > 0 || kind.eq_ignore_ascii_case("group") {
        let mut children = Vec::with_capacity(subsets);
        while children.len() < subsets {
            match records.next() {
                Some(Record::Set {
                    name: child,
                    kind,
                    subsets,
                }) => children.push(build_set(child, &kind, subsets, records)?),
                Some(Record::Member { path }) => {
                    warn!(
                        "Ignoring device {} listed directly under RAID group {name}",
                        path.display()
                    );
                }
                None => {
                    return Err(DmError::Dm(
                        ErrorEnum::DiscoveryFailed,
                        format!(
                            "dmraid output ends after {} of {subsets} subsets of {name}",
                            children.len()
                        ),
                    ))
                }
            }
        }
        Ok(RaidSet::Group {
            name,
            subsets: children,
        })
    } else {
        let mut members = Vec::new();
        while let Some(Record::Member { path }) =
            records.next_if(|record| matches!(record, Record::Member { .. }))
        {
            members.push(RaidMember::new(path));
        }
        Ok(RaidSet::Leaf { name, members })
    }
}

/// Parse the output of `dmraid -s -c -c -c` into a forest of RAID sets.
///
/// Each set line is followed by its subsets' lines, if it is a group, or
/// by the lines of its member devices, if it is not.
pub fn parse_dmraid_sets(output: &str) -> DmResult<Vec<RaidSet>> {
    let records = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_record)
        .collect::<DmResult<Vec<_>>>()?;

    let mut records = records.into_iter().peekable();
    let mut forest = Vec::new();
    while let Some(record) = records.next() {
        match record {
            Record::Set {
                name,
                kind,
                subsets,
            } => forest.push(build_set(name, &kind, subsets, &mut records)?),
            Record::Member { path } => {
                warn!(
                    "Ignoring device {} that belongs to no RAID set",
                    path.display()
                );
            }
        }
    }
    Ok(forest)
}
