pub mod charts;

pub use charts::BitmapRenderer;

use std::path::{Path, PathBuf};

use crate::aggregate::DerivedView;
use crate::error::Result;

/// Turns one derived view into exactly one image artifact at the given
/// path, overwriting any existing file there.
pub trait Renderer {
    fn render(&self, view: &DerivedView, dest: &Path) -> Result<()>;
}

/// Deterministic artifact destination for `view` under `out_dir`.
pub fn artifact_path(out_dir: &Path, view: &DerivedView) -> PathBuf {
    out_dir.join(format!("{}.png", view.slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::derive_views;
    use crate::transform::ShipRecord;

    #[test]
    fn artifact_names_are_deterministic_per_view() {
        let fleet = vec![ShipRecord {
            company_name: "Maersk".into(),
            ship_name: "Alpha".into(),
            built_year: 2001,
            gross_tonnage: 50_000.0,
            deadweight_tonnage: 80_000.0,
            length: 300.0,
            width: 40.0,
        }];
        let views = derive_views(&fleet).unwrap();
        let names: Vec<PathBuf> = views
            .iter()
            .map(|v| artifact_path(Path::new("out"), v))
            .collect();
        assert_eq!(names[0], Path::new("out/ship_company_bar.png"));
        assert_eq!(names[6], Path::new("out/ship_name_pie.png"));
        // One artifact per view, no collisions.
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }
}
