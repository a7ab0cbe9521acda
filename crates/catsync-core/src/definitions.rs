/// Metafield type used for every definition and every written value.
pub const SINGLE_LINE_TEXT: &str = "single_line_text_field";

/// A variant metafield definition registered before any rows are synced so
/// the fields show up in the admin UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetafieldDefinitionSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub value_type: &'static str,
}

const fn text(
    key: &'static str,
    name: &'static str,
    description: &'static str,
) -> MetafieldDefinitionSpec {
    MetafieldDefinitionSpec {
        key,
        name,
        description,
        value_type: SINGLE_LINE_TEXT,
    }
}

/// The fixed definition catalog. Independent of the source table's columns.
pub const VARIANT_METAFIELD_DEFINITIONS: &[MetafieldDefinitionSpec] = &[
    text("material", "Material", "Product material (e.g., PCD)"),
    text("diameter", "Diameter", "Product diameter in mm"),
    text("thickness", "Thickness", "Product thickness in mm"),
    text("bore", "Bore", "Bore diameter specification"),
    text("z_teeth", "Z Teeth", "Number of teeth"),
    text("loc_cutting_length", "LOC Cutting Length", "Length of cut in mm"),
    text("tl_total_length", "TL Total Length", "Total length in mm"),
    text("pd_flute_length", "PD Flute Length", "Flute length in mm"),
    text("shank_diameter", "Shank Diameter", "Shank diameter in mm"),
];
