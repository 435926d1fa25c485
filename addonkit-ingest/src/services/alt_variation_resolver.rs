//! Hair-hiding detection from alternate variation rules

use crate::models::{Drawable, PedAlternativeVariations};

/// Whether `number` of a component drawable is a source asset of any switch
/// belonging to the drawable's ped
///
/// Props never hide hair.
pub fn hides_hair(variations: &PedAlternativeVariations, drawable: &Drawable, number: u32) -> bool {
    if drawable.is_prop {
        return false;
    }

    let Some(ped) = variations.ped(drawable.sex.ped_name()) else {
        return false;
    };

    ped.switches.iter().any(|switch| {
        switch
            .source_assets
            .iter()
            .any(|asset| asset.component == drawable.category && asset.index == number)
    })
}
