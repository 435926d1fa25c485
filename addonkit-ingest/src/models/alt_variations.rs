//! Alternate variation rules (`pedalternativevariations.meta`)
//!
//! ```xml
//! <CAlternateVariations>
//!   <peds>
//!     <Item>
//!       <name>mp_f_freemode_01</name>
//!       <switches>
//!         <Item>
//!           <component value="2" />
//!           <index value="0" />
//!           <alt value="1" />
//!           <sourceAssets>
//!             <Item>
//!               <component value="1" />
//!               <index value="5" />
//!             </Item>
//!           </sourceAssets>
//!         </Item>
//!       </switches>
//!     </Item>
//!   </peds>
//! </CAlternateVariations>
//! ```

use addonkit_common::{Error, Result};
use serde::Deserialize;

/// Parsed alternate variation file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PedAlternativeVariations {
    pub peds: Vec<PedVariation>,
}

/// Switch rules for one ped model
#[derive(Debug, Clone, PartialEq)]
pub struct PedVariation {
    pub name: String,
    pub switches: Vec<AlternateSwitch>,
}

/// One switch rule: when any source asset is worn, the target swaps to `alt`
#[derive(Debug, Clone, PartialEq)]
pub struct AlternateSwitch {
    pub component: u32,
    pub index: u32,
    pub alt: u32,
    pub source_assets: Vec<SourceAsset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceAsset {
    pub component: u32,
    pub index: u32,
}

impl PedAlternativeVariations {
    /// Decode the XML document
    pub fn from_xml(xml: &str) -> Result<Self> {
        let raw: RawDocument = quick_xml::de::from_str(xml)
            .map_err(|e| Error::Definition(format!("Invalid alternate variations XML: {}", e)))?;
        Ok(raw.into())
    }

    /// Switch rules of the ped with `name`
    pub fn ped(&self, name: &str) -> Option<&PedVariation> {
        self.peds.iter().find(|p| p.name == name)
    }
}

// Wire shapes matching the game's `<Item>` list encoding.

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    peds: RawList<RawPed>,
}

#[derive(Deserialize)]
struct RawList<T> {
    #[serde(rename = "Item", default = "Vec::new")]
    items: Vec<T>,
}

impl<T> Default for RawList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

#[derive(Deserialize)]
struct RawValue {
    #[serde(rename = "@value")]
    value: u32,
}

#[derive(Deserialize)]
struct RawPed {
    name: String,
    #[serde(default)]
    switches: RawList<RawSwitch>,
}

#[derive(Deserialize)]
struct RawSwitch {
    component: RawValue,
    index: RawValue,
    alt: Option<RawValue>,
    #[serde(rename = "sourceAssets", default)]
    source_assets: RawList<RawSourceAsset>,
}

#[derive(Deserialize)]
struct RawSourceAsset {
    component: RawValue,
    index: RawValue,
}

impl From<RawDocument> for PedAlternativeVariations {
    fn from(raw: RawDocument) -> Self {
        let peds = raw
            .peds
            .items
            .into_iter()
            .map(|ped| PedVariation {
                name: ped.name.trim().to_string(),
                switches: ped
                    .switches
                    .items
                    .into_iter()
                    .map(|sw| AlternateSwitch {
                        component: sw.component.value,
                        index: sw.index.value,
                        alt: sw.alt.map(|a| a.value).unwrap_or(0),
                        source_assets: sw
                            .source_assets
                            .items
                            .into_iter()
                            .map(|a| SourceAsset {
                                component: a.component.value,
                                index: a.index.value,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Self { peds }
    }
}
