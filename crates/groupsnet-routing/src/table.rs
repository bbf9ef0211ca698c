//! Precomputed route table
//!
//! The [`RouteTable`] maps a message's origin id to the set of nodes the
//! message may be relayed through. Routes are computed offline and loaded
//! from a plain text file with one record per line:
//!
//! ```text
//! <origin> <node> <node> ...
//! ```
//!
//! All tokens are whitespace-separated non-negative integers. Blank lines are
//! skipped. A table is loaded once before the simulation starts and shared
//! read-only by every router through an `Arc`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use groupsnet_core::{NodeAddress, OriginId, Route};
use tracing::{debug, info};

use crate::error::RouteTableError;

/// Immutable mapping from origin id to authorized relay nodes
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<OriginId, Route>,
}

impl RouteTable {
    /// Load a route table from a file
    ///
    /// Any failure is a fatal configuration error and no table is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteTableError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading route table");

        let file = File::open(path).map_err(|source| RouteTableError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(BufReader::new(file), path)?;

        info!(path = %path.display(), origins = table.len(), "Route table loaded");
        Ok(table)
    }

    /// Parse route records from any buffered reader
    ///
    /// `source` only labels errors.
    pub fn parse<R: BufRead>(reader: R, source: impl AsRef<Path>) -> Result<Self, RouteTableError> {
        let source = source.as_ref();
        let mut routes = HashMap::new();

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|err| RouteTableError::Read {
                path: source.to_path_buf(),
                line: line_no,
                source: err,
            })?;

            let mut tokens = line.split_whitespace();
            let Some(first) = tokens.next() else {
                continue;
            };

            let origin = OriginId(parse_token(first, source, line_no)?);
            let route = tokens
                .map(|token| parse_token(token, source, line_no).map(NodeAddress))
                .collect::<Result<Route, _>>()?;

            match routes.entry(origin) {
                Entry::Occupied(_) => {
                    return Err(RouteTableError::DuplicateOrigin {
                        path: source.to_path_buf(),
                        line: line_no,
                        origin,
                    });
                }
                Entry::Vacant(slot) => {
                    debug!(origin = %origin, route = %route, "Parsed route record");
                    slot.insert(route);
                }
            }
        }

        Ok(Self { routes })
    }

    /// Build a table from in-memory records
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (OriginId, Route)>,
    {
        Self {
            routes: records.into_iter().collect(),
        }
    }

    /// Get the route for an origin id
    ///
    /// Returns `None` if no route is defined.
    pub fn lookup(&self, origin: OriginId) -> Option<&Route> {
        self.routes.get(&origin)
    }

    /// Check if a route is defined for an origin id
    pub fn contains(&self, origin: OriginId) -> bool {
        self.routes.contains_key(&origin)
    }

    /// Number of origins with a route
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All origin ids, sorted
    pub fn origins(&self) -> Vec<OriginId> {
        let mut origins: Vec<_> = self.routes.keys().copied().collect();
        origins.sort();
        origins
    }
}

fn parse_token(token: &str, source: &Path, line: usize) -> Result<u32, RouteTableError> {
    token.parse().map_err(|_| RouteTableError::InvalidToken {
        path: PathBuf::from(source),
        line,
        token: token.to_string(),
    })
}
