//! Column names and fixed labels of the NYPD shooting incident dataset

/// Public CSV endpoint for NYPD Shooting Incident Data (Historic)
pub const DATASET_URL: &str =
    "https://data.cityofnewyork.us/api/views/833y-fsy8/rows.csv?accessType=DOWNLOAD";

pub const OCCUR_DATE: &str = "OCCUR_DATE";
pub const BORO: &str = "BORO";
pub const MURDER_FLAG: &str = "STATISTICAL_MURDER_FLAG";
pub const LOC_OF_OCCUR_DESC: &str = "LOC_OF_OCCUR_DESC";
pub const LOC_CLASSFCTN_DESC: &str = "LOC_CLASSFCTN_DESC";
pub const LOCATION_DESC: &str = "LOCATION_DESC";
pub const PERP_AGE_GROUP: &str = "PERP_AGE_GROUP";
pub const PERP_SEX: &str = "PERP_SEX";
pub const PERP_RACE: &str = "PERP_RACE";
pub const VIC_AGE_GROUP: &str = "VIC_AGE_GROUP";
pub const VIC_SEX: &str = "VIC_SEX";
pub const VIC_RACE: &str = "VIC_RACE";

/// Derived columns
pub const MONTH_YEAR: &str = "MONTH_YEAR";
pub const PERP_RACE_MISSING: &str = "PERP_RACE_MISSING";
pub const COUNT: &str = "Count";

/// Identifier, geo-coordinate and jurisdiction columns removed by projection
pub const DROPPED_COLUMNS: [&str; 8] = [
    "INCIDENT_KEY",
    "PRECINCT",
    "JURISDICTION_CODE",
    "X_COORD_CD",
    "Y_COORD_CD",
    "Latitude",
    "Longitude",
    "Lon_Lat",
];

/// Categorical fields whose missing values are replaced by [`IMPUTED_LABEL`]
pub const IMPUTED_COLUMNS: [&str; 6] = [
    LOC_OF_OCCUR_DESC,
    LOC_CLASSFCTN_DESC,
    LOCATION_DESC,
    PERP_AGE_GROUP,
    PERP_SEX,
    PERP_RACE,
];

/// Raw spellings of "no value" in the source data (nulls are handled separately)
pub const MISSING_ENCODINGS: [&str; 2] = ["", "(null)"];

/// Constant label substituted for missing categorical values.
/// Distinct from the source's own "UNKNOWN" category.
pub const IMPUTED_LABEL: &str = "NOT DOCUMENTED";

/// Display label for nulls in fields that are never imputed
pub const UNRECORDED_LABEL: &str = "(missing)";

/// Murder flag value (after upper-casing) that marks a murder
pub const MURDER_FLAG_TRUE: &str = "TRUE";

/// Source date format of OCCUR_DATE
pub const OCCUR_DATE_FORMAT: &str = "%m/%d/%Y";

/// Default regression baseline for the victim race predictor
pub const DEFAULT_REFERENCE_CATEGORY: &str = "WHITE";

/// Columns read by the cleaner and analyzer; loading fails if any is absent
pub const REQUIRED_COLUMNS: [&str; 12] = [
    OCCUR_DATE,
    BORO,
    MURDER_FLAG,
    LOC_OF_OCCUR_DESC,
    LOC_CLASSFCTN_DESC,
    LOCATION_DESC,
    PERP_AGE_GROUP,
    PERP_SEX,
    PERP_RACE,
    VIC_AGE_GROUP,
    VIC_SEX,
    VIC_RACE,
];
