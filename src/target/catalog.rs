use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Error;

/// A known insertion site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSite {
    /// Insertion line name
    pub name: String,
    /// Transposon family, bare (`copia`) or composite (`copia#LTR/Copia`)
    pub te_name: String,
    pub chrom: String,
    /// 1-based reference position
    pub pos: u64,
    /// Inserted element length, when known
    pub length: Option<u64>,
}

impl TargetSite {
    pub fn new(name: &str, te_name: &str, chrom: &str, pos: u64) -> Self {
        Self {
            name: name.to_string(),
            te_name: te_name.to_string(),
            chrom: chrom.to_string(),
            pos,
            length: None,
        }
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }
}

/// Ordered, immutable list of target sites.
#[derive(Debug, Clone)]
pub struct TargetCatalog {
    targets: Vec<TargetSite>,
}

impl TargetCatalog {
    /// Build a catalog; names must be unique and the list non-empty.
    pub fn new(targets: Vec<TargetSite>) -> Result<Self, Error> {
        if targets.is_empty() {
            return Err(Error::Catalog("catalog contains no targets".into()));
        }
        let mut seen = HashSet::new();
        for target in &targets {
            if !seen.insert(target.name.as_str()) {
                return Err(Error::Catalog(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }
        }
        Ok(Self { targets })
    }

    /// Load a tab-separated catalog: `name  te_name  chrom  pos  [length]`.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::io(e, path))?;
        let reader = BufReader::new(file);

        let mut targets = Vec::new();
        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|e| Error::io(e, path))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let target = parse_line(line).map_err(|msg| {
                Error::Catalog(format!("{} at {}:{}", msg, path.display(), line_num + 1))
            })?;
            targets.push(target);
        }

        Self::new(targets).map_err(|e| match e {
            Error::Catalog(msg) => Error::Catalog(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Keep only the named target.
    pub fn restrict_to(&self, name: &str) -> Result<Self, Error> {
        let target = self
            .get(name)
            .ok_or_else(|| Error::TargetNotFound(name.to_string()))?;
        Ok(Self {
            targets: vec![target.clone()],
        })
    }

    pub fn get(&self, name: &str) -> Option<&TargetSite> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TargetSite> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl<'a> IntoIterator for &'a TargetCatalog {
    type Item = &'a TargetSite;
    type IntoIter = std::slice::Iter<'a, TargetSite>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

fn parse_line(line: &str) -> Result<TargetSite, String> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() < 4 || fields.len() > 5 {
        return Err(format!(
            "expected 4 or 5 tab-separated columns, found {}",
            fields.len()
        ));
    }
    if fields[..3].iter().any(|f| f.is_empty()) {
        return Err("empty name, transposon or chromosome".into());
    }

    let pos: u64 = fields[3]
        .parse()
        .map_err(|_| format!("invalid position '{}'", fields[3]))?;
    let mut target = TargetSite::new(fields[0], fields[1], fields[2], pos);

    if let Some(length) = fields.get(4).filter(|f| !f.is_empty()) {
        let length: u64 = length
            .parse()
            .map_err(|_| format!("invalid length '{length}'"))?;
        if length == 0 {
            return Err("length must be positive".into());
        }
        target = target.with_length(length);
    }

    Ok(target)
}
