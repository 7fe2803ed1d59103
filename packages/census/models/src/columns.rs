//! Column headers as they appear in the census spreadsheet.
//!
//! Headers are data, not code: they come straight from the INEP export and
//! stay in Portuguese. Normalization trims surrounding whitespace, so the
//! constants here are the trimmed forms.

/// IBGE municipality code column (shared with the `GeoJSON` properties).
pub const CD_MUN: &str = "CD_MUN";

/// Municipality name column on the aggregate sheet.
pub const MUNICIPALITY: &str = "Municípios";

/// Unaccented variant some exports use.
pub const MUNICIPALITY_ALT: &str = "Municipios";

/// Total school count per municipality.
pub const TOTAL_SCHOOLS: &str = "Total de Escolas por município";

pub const STATE_SCHOOLS: &str = "Estadual";
pub const MUNICIPAL_SCHOOLS: &str = "Municipal";
pub const FEDERAL_SCHOOLS: &str = "Federal";
pub const PRIVATE_SCHOOLS: &str = "Privada";

pub const BAND_UP_TO_50: &str = "Até 50 matrículas de escolarização";
pub const BAND_51_TO_200: &str = "Entre 51 e 200 matrículas de escolarização";
pub const BAND_201_TO_500: &str = "Entre 201 e 500 matrículas de escolarização";
pub const BAND_501_TO_1000: &str = "Entre 501 e 1000 matrículas de escolarização";
pub const BAND_OVER_1000: &str = "Mais de 1000 matrículas de escolarização";
pub const BAND_NO_ENROLLMENT: &str = "Escola sem matrícula de escolarização";

/// Municipality name column on the school-list sheet.
pub const SCHOOL_MUNICIPALITY: &str = "Município";

/// Unaccented variant.
pub const SCHOOL_MUNICIPALITY_ALT: &str = "Municipio";

/// Administrative category of a school.
pub const CATEGORY: &str = "Categoria Administrativa";

/// Older header carrying the same information.
pub const CATEGORY_ALT: &str = "Dependência Administrativa";

pub const SCHOOL_NAME: &str = "Escola";
pub const INEP_CODE: &str = "Código INEP";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

/// Municipality name property on boundary features.
pub const NM_MUN: &str = "NM_MUN";
