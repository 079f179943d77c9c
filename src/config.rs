//! Centralized configuration for mdfcarve.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - CarveConfig::from_env() reads the MDF_* variables; CarveBuilder starts from env
//!   and allows explicit overrides (CLI flags win over env).
//!
//! Tunables:
//! - expected_maxlinks: fan-out an INTERNAL LOB node is expected to declare (501).
//! - max_tree_pages: bound on internal pages visited by one tree walk.
//! - max_object_bytes: bound on the size of one reassembled LOB.
//! - strict: any collected warning fails the run (extract_large refuses to go on,
//!   the CLI checks the rest).

use std::fmt;

use crate::consts::STANDARD_INTERNAL_MAXLINKS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarveConfig {
    /// Expected maxlinks of an INTERNAL node; deviation is a warning.
    /// Env: MDF_EXPECTED_MAXLINKS (default 501)
    pub expected_maxlinks: u16,

    /// Max internal pages one walk may visit before giving up with a structure error.
    /// Env: MDF_MAX_TREE_PAGES (default 1_000_000)
    pub max_tree_pages: usize,

    /// Max bytes of one reassembled object.
    /// Env: MDF_MAX_OBJECT_BYTES (default 4 GiB)
    pub max_object_bytes: u64,

    /// Treat warnings as a failed run.
    /// Env: MDF_STRICT ("1|true|on|yes" => true)
    pub strict: bool,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            expected_maxlinks: STANDARD_INTERNAL_MAXLINKS,
            max_tree_pages: 1_000_000,
            max_object_bytes: 4u64 << 30,
            strict: false,
        }
    }
}

#[inline]
fn env_flag(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "on" || s == "yes"
}

impl CarveConfig {
    /// Load configuration from environment variables on top of defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("MDF_EXPECTED_MAXLINKS") {
            if let Ok(n) = v.trim().parse::<u16>() {
                cfg.expected_maxlinks = n;
            }
        }

        if let Ok(v) = std::env::var("MDF_MAX_TREE_PAGES") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.max_tree_pages = n;
            }
        }

        if let Ok(v) = std::env::var("MDF_MAX_OBJECT_BYTES") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.max_object_bytes = n;
            }
        }

        if let Ok(v) = std::env::var("MDF_STRICT") {
            cfg.strict = env_flag(&v);
        }

        cfg
    }

    pub fn builder() -> CarveBuilder {
        CarveBuilder::new()
    }
}

impl fmt::Display for CarveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CarveConfig {{ expected_maxlinks: {}, max_tree_pages: {}, \
             max_object_bytes: {}, strict: {} }}",
            self.expected_maxlinks, self.max_tree_pages, self.max_object_bytes, self.strict
        )
    }
}

/// Builder that produces a CarveConfig.
#[derive(Clone, Debug)]
pub struct CarveBuilder {
    cfg: CarveConfig,
}

impl Default for CarveBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: CarveConfig::from_env(),
        }
    }
}

impl CarveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: CarveConfig::default(),
        }
    }

    pub fn expected_maxlinks(mut self, n: u16) -> Self {
        self.cfg.expected_maxlinks = n;
        self
    }

    pub fn max_tree_pages(mut self, n: usize) -> Self {
        self.cfg.max_tree_pages = n;
        self
    }

    pub fn max_object_bytes(mut self, n: u64) -> Self {
        self.cfg.max_object_bytes = n;
        self
    }

    pub fn strict(mut self, on: bool) -> Self {
        self.cfg.strict = on;
        self
    }

    pub fn build(self) -> CarveConfig {
        self.cfg
    }
}
