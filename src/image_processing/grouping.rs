use std::collections::HashMap;

use super::{Dimensions, ImageFile};
use crate::cli::GroupSelector;
use crate::error::ExportError;
use crate::utils::{verbose_println, warn_println};

/// Images sharing one exact pixel size, in discovery order
#[derive(Debug, Clone)]
pub struct DimensionGroup {
    pub dimensions: Dimensions,
    pub files: Vec<ImageFile>,
}

/// Dimension groups ordered largest area first (then width, then height).
///
/// Group ordinals shown to the user are 1-based positions in this order.
#[derive(Debug, Clone, Default)]
pub struct GroupTable {
    groups: Vec<DimensionGroup>,
}

impl GroupTable {
    pub fn groups(&self) -> &[DimensionGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, dimensions: Dimensions) -> Option<&DimensionGroup> {
        self.groups.iter().find(|g| g.dimensions == dimensions)
    }

    /// Resolve a group-mode selector; manual mode has no group
    pub fn resolve(&self, selector: &GroupSelector, raw: &str) -> Result<&DimensionGroup, ExportError> {
        match selector {
            GroupSelector::Index(index) if (1..=self.groups.len()).contains(index) => {
                Ok(&self.groups[index - 1])
            }
            GroupSelector::Dimensions(dimensions) => self
                .get(*dimensions)
                .ok_or_else(|| ExportError::InvalidGroup(raw.to_string())),
            _ => Err(ExportError::InvalidGroup(raw.to_string())),
        }
    }
}

/// Partition images by exact pixel size. Files whose header cannot be read are
/// reported and left out of every group.
pub fn group_by_dimensions(files: &[ImageFile], verbose: bool) -> GroupTable {
    let mut by_size: HashMap<Dimensions, Vec<ImageFile>> = HashMap::new();
    let mut order: Vec<Dimensions> = Vec::new();

    for file in files {
        match file.dimensions() {
            Ok(dimensions) => {
                verbose_println(verbose, &format!("{}: {}", file.file_name(), dimensions));
                by_size
                    .entry(dimensions)
                    .or_insert_with(|| {
                        order.push(dimensions);
                        Vec::new()
                    })
                    .push(file.clone());
            }
            Err(e) => warn_println(&format!("{:#}", e)),
        }
    }

    let mut groups: Vec<DimensionGroup> = order
        .into_iter()
        .filter_map(|dimensions| {
            by_size.remove(&dimensions).map(|files| DimensionGroup { dimensions, files })
        })
        .collect();

    groups.sort_by(|a, b| {
        let key = |d: Dimensions| (d.area(), d.width, d.height);
        key(b.dimensions).cmp(&key(a.dimensions))
    });

    GroupTable { groups }
}
