//! Sheet names, labels and column headers of the current workbook layout.

pub const SHEET_INSTALLATION: &str = "A_InstData";
pub const SHEET_SOURCE_STREAMS: &str = "B_EmInst";
pub const SHEET_BALANCE: &str = "C_Emissions&Energy";
pub const SHEET_PROCESSES: &str = "D_Processes";
pub const SHEET_PRECURSORS: &str = "E_PurchPrec";
pub const SHEET_ADDITIONAL: &str = "F_AddEmissions";

/// First cell of the row that closes a table with totals.
pub const TOTAL_ROW: &str = "Total";
/// First cell of the row that closes a table without totals.
pub const END_ROW: &str = "END";

pub const ALL_SHEETS: [&str; 6] = [
    SHEET_INSTALLATION,
    SHEET_SOURCE_STREAMS,
    SHEET_BALANCE,
    SHEET_PROCESSES,
    SHEET_PRECURSORS,
    SHEET_ADDITIONAL,
];

pub mod installation {
    pub const NAME: &str = "Installation name";
    pub const ID: &str = "Installation ID";
    pub const OPERATOR: &str = "Operator name";
    pub const STREET: &str = "Street";
    pub const CITY: &str = "City";
    pub const POST_CODE: &str = "Post code";
    pub const COUNTRY: &str = "Country code";
    pub const ACTIVITY: &str = "Economic activity";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const PERIOD_START: &str = "Reporting period start";
    pub const PERIOD_END: &str = "Reporting period end";
    pub const CONTACT_NAME: &str = "Contact name";
    pub const CONTACT_EMAIL: &str = "Contact email";
}

pub mod streams {
    pub const TITLE: &str = "B.1 Source streams";
    pub const ID: &str = "Stream ID";
    pub const NAME: &str = "Stream name";
    pub const METHOD: &str = "Method";
    pub const ACTIVITY: &str = "Activity data";
    pub const ACTIVITY_UNIT: &str = "Activity data unit";
    pub const NCV: &str = "Net calorific value";
    pub const NCV_UNIT: &str = "NCV unit";
    pub const EF: &str = "Emission factor";
    pub const EF_UNIT: &str = "Emission factor unit";
    pub const CARBON: &str = "Carbon content";
    pub const OXIDATION: &str = "Oxidation factor";
    pub const CONVERSION: &str = "Conversion factor";
    pub const BIOMASS: &str = "Biomass content";
    pub const NON_SUSTAINABLE: &str = "Non-sustainable biomass content";
    pub const UNCERTAINTY: &str = "Uncertainty";
    pub const FOSSIL: &str = "Fossil CO2e";
    pub const BIOMASS_CO2E: &str = "Biomass CO2e";
    pub const NON_SUSTAINABLE_CO2E: &str = "Non-sustainable biomass CO2e";
    pub const TOTAL: &str = "Total emissions";
    pub const ENERGY_FOSSIL: &str = "Energy content fossil";
    pub const ENERGY_BIOMASS: &str = "Energy content biomass";

    pub const HEADER: [&str; 21] = [
        ID, NAME, METHOD, ACTIVITY, ACTIVITY_UNIT, NCV, NCV_UNIT, EF, EF_UNIT, CARBON,
        OXIDATION, CONVERSION, BIOMASS, NON_SUSTAINABLE, UNCERTAINTY, FOSSIL, BIOMASS_CO2E,
        NON_SUSTAINABLE_CO2E, TOTAL, ENERGY_FOSSIL, ENERGY_BIOMASS,
    ];
}

pub mod pfc {
    pub const TITLE: &str = "B.2 PFC emissions";
    pub const ID: &str = "PFC source ID";
    pub const NAME: &str = "PFC source name";
    pub const METHOD: &str = "PFC method";
    pub const TECHNOLOGY: &str = "Technology type";
    pub const ACTIVITY: &str = "Primary aluminium";
    pub const FREQUENCY: &str = "Anode effect frequency";
    pub const DURATION: &str = "Anode effect duration";
    pub const SLOPE: &str = "Slope coefficient CF4";
    pub const OVC: &str = "Overvoltage coefficient";
    pub const OVERVOLTAGE: &str = "Anode effect overvoltage";
    pub const CURRENT_EFFICIENCY: &str = "Current efficiency";
    pub const C2F6_FRACTION: &str = "C2F6 weight fraction";
    pub const REPORTED_CF4: &str = "Reported CF4";
    pub const REPORTED_C2F6: &str = "Reported C2F6";
    pub const UNCERTAINTY: &str = "PFC uncertainty";
    pub const CF4: &str = "CF4 emissions";
    pub const C2F6: &str = "C2F6 emissions";
    pub const TOTAL: &str = "PFC total CO2e";

    pub const HEADER: [&str; 18] = [
        ID, NAME, METHOD, TECHNOLOGY, ACTIVITY, FREQUENCY, DURATION, SLOPE, OVC, OVERVOLTAGE,
        CURRENT_EFFICIENCY, C2F6_FRACTION, REPORTED_CF4, REPORTED_C2F6, UNCERTAINTY, CF4, C2F6,
        TOTAL,
    ];
}

pub mod measurement {
    pub const TITLE: &str = "B.3 Measurement-based sources";
    pub const ID: &str = "Measurement source ID";
    pub const NAME: &str = "Measurement source name";
    pub const GAS: &str = "Gas";
    pub const CONCENTRATION: &str = "Average concentration";
    pub const FLOW: &str = "Flue gas flow";
    pub const HOURS: &str = "Operating hours";
    pub const BIOMASS: &str = "Measured biomass content";
    pub const UNCERTAINTY: &str = "Measurement uncertainty";
    pub const EMISSIONS: &str = "Annual emissions";
    pub const TOTAL: &str = "Measured total CO2e";

    pub const HEADER: [&str; 10] = [
        ID, NAME, GAS, CONCENTRATION, FLOW, HOURS, BIOMASS, UNCERTAINTY, EMISSIONS, TOTAL,
    ];
}

pub mod balance {
    pub const TITLE: &str = "C. Emissions and energy balance";
    pub const HEADER: [&str; 3] = ["Item", "Value", "Mode"];
    pub const DIRECT_CBAM_GOODS: &str = "Fuel input for CBAM goods";
    pub const FOR_ELECTRICITY: &str = "Fuel input for electricity";
    pub const DIRECT_NON_CBAM: &str = "Fuel input for non-CBAM goods";
    pub const TOTAL_FUEL: &str = "Total fuel input";
    pub const CO2: &str = "CO2 emissions";
    pub const BIOMASS_CO2: &str = "Biomass CO2 emissions";
    pub const N2O: &str = "N2O emissions";
    pub const PFC: &str = "PFC emissions";
    pub const TOTAL_DIRECT: &str = "Total direct emissions";
    pub const TOTAL_INDIRECT: &str = "Total indirect emissions";
    pub const TOTAL_EMISSIONS: &str = "Total emissions";
}

pub mod processes {
    pub const TITLE: &str = "D.1 Production processes";
    pub const ID: &str = "Process ID";
    pub const NAME: &str = "Process name";
    pub const AMOUNT: &str = "Production amount";
    pub const UNIT: &str = "Production unit";
    pub const FOR_MARKET: &str = "Produced for market";
    pub const MARKET_SHARE: &str = "Market share";
    pub const DIRECT_APPLICABLE: &str = "Direct applicable";
    pub const DIRECT: &str = "Direct emissions";
    pub const DIRECT_UNIT: &str = "Direct unit";
    pub const HEAT_APPLICABLE: &str = "Heat applicable";
    pub const HEAT_NET: &str = "Net heat";
    pub const HEAT_IMPORTED: &str = "Imported heat";
    pub const HEAT_EXPORTED: &str = "Exported heat";
    pub const HEAT_UNIT: &str = "Heat unit";
    pub const HEAT_EF: &str = "Heat emission factor";
    pub const HEAT_EF_UNIT: &str = "Heat EF unit";
    pub const HEAT_SHARE: &str = "Heat share";
    pub const GAS_APPLICABLE: &str = "Waste gas applicable";
    pub const GAS_NET: &str = "Net waste gas";
    pub const GAS_IMPORTED: &str = "Imported waste gas";
    pub const GAS_EXPORTED: &str = "Exported waste gas";
    pub const GAS_UNIT: &str = "Waste gas unit";
    pub const GAS_REUSED: &str = "Reused waste gas share";
    pub const GAS_EF: &str = "Waste gas emission factor";
    pub const GAS_EF_UNIT: &str = "Waste gas EF unit";
    pub const ELECTRICITY_APPLICABLE: &str = "Electricity applicable";
    pub const ELECTRICITY: &str = "Electricity consumption";
    pub const ELECTRICITY_UNIT: &str = "Electricity unit";
    pub const ELECTRICITY_EF: &str = "Electricity emission factor";
    pub const ELECTRICITY_EF_UNIT: &str = "Electricity EF unit";
    pub const EXPORT_APPLICABLE: &str = "Export applicable";
    pub const EXPORT: &str = "Exported electricity";
    pub const EXPORT_UNIT: &str = "Export unit";
    pub const EXPORT_EF: &str = "Export emission factor";
    pub const EXPORT_EF_UNIT: &str = "Export EF unit";
    pub const NET: &str = "Net attributed emissions";
    pub const SEE: &str = "Specific embedded emissions";

    pub const HEADER: [&str; 37] = [
        ID,
        NAME,
        AMOUNT,
        UNIT,
        FOR_MARKET,
        MARKET_SHARE,
        DIRECT_APPLICABLE,
        DIRECT,
        DIRECT_UNIT,
        HEAT_APPLICABLE,
        HEAT_NET,
        HEAT_IMPORTED,
        HEAT_EXPORTED,
        HEAT_UNIT,
        HEAT_EF,
        HEAT_EF_UNIT,
        HEAT_SHARE,
        GAS_APPLICABLE,
        GAS_NET,
        GAS_IMPORTED,
        GAS_EXPORTED,
        GAS_UNIT,
        GAS_REUSED,
        GAS_EF,
        GAS_EF_UNIT,
        ELECTRICITY_APPLICABLE,
        ELECTRICITY,
        ELECTRICITY_UNIT,
        ELECTRICITY_EF,
        ELECTRICITY_EF_UNIT,
        EXPORT_APPLICABLE,
        EXPORT,
        EXPORT_UNIT,
        EXPORT_EF,
        EXPORT_EF_UNIT,
        NET,
        SEE,
    ];
}

pub mod flows {
    pub const TITLE: &str = "D.2 Process to process";
    pub const FROM: &str = "From process ID";
    pub const TO: &str = "To process ID";
    pub const SHARE: &str = "Flow share";
    pub const AMOUNT: &str = "Flow amount";
    pub const UNIT: &str = "Flow unit";
    pub const METHOD: &str = "Calculation method";

    pub const HEADER: [&str; 6] = [FROM, TO, SHARE, AMOUNT, UNIT, METHOD];
}

pub mod products {
    pub const TITLE: &str = "D.3 Process to product";
    pub const PROCESS: &str = "Source process ID";
    pub const NAME: &str = "Product name";
    pub const CN_CODE: &str = "Product CN code";
    pub const SHARE: &str = "Product share";
    pub const AMOUNT: &str = "Product amount";
    pub const UNIT: &str = "Product unit";

    pub const HEADER: [&str; 6] = [PROCESS, NAME, CN_CODE, SHARE, AMOUNT, UNIT];
}

pub mod consumption {
    pub const TITLE: &str = "D.4 Precursor consumption";
    pub const PROCESS: &str = "Consuming process ID";
    pub const PRECURSOR_ID: &str = "Consumed precursor ID";
    pub const PRECURSOR_NAME: &str = "Consumed precursor name";
    pub const AMOUNT: &str = "Consumed amount";
    pub const UNIT: &str = "Consumed unit";
    pub const ORIGIN: &str = "Origin";

    pub const HEADER: [&str; 6] = [PROCESS, PRECURSOR_ID, PRECURSOR_NAME, AMOUNT, UNIT, ORIGIN];
}

pub mod precursor_summary {
    pub const TITLE: &str = "E.1 Purchased precursors summary";
    pub const QUANTITY: &str = "Sum of quantities";
    pub const DIRECT: &str = "Sum of direct embedded emissions";
    pub const INDIRECT: &str = "Sum of indirect embedded emissions";
    pub const EMBEDDED: &str = "Sum of embedded emissions";
    pub const COUNT: &str = "Number of precursors";
    pub const VERIFIED: &str = "Verified precursors";
    pub const DEFAULTS: &str = "Precursors using default values";
    pub const COMPLETENESS: &str = "Average completeness";
    pub const QUALITY: &str = "Overall data quality";
}

pub mod precursors {
    pub const TITLE: &str = "E.2 Purchased precursors";
    pub const ID: &str = "Precursor ID";
    pub const NAME: &str = "Precursor name";
    pub const CN_CODE: &str = "CN code";
    pub const QUANTITY: &str = "Quantity";
    pub const UNIT: &str = "Unit";
    pub const NON_CBAM: &str = "Non-CBAM quantity";
    pub const SUPPLIER: &str = "Supplier name";
    pub const SUPPLIER_INSTALLATION: &str = "Supplier installation ID";
    pub const SUPPLIER_COUNTRY: &str = "Supplier country";
    pub const ROUTE: &str = "Production route";
    pub const DIRECT: &str = "Direct embedded emissions";
    pub const INDIRECT: &str = "Indirect embedded emissions";
    pub const ELECTRICITY: &str = "Electricity consumption";
    pub const ELECTRICITY_EF: &str = "Electricity emission factor";
    pub const ELECTRICITY_SOURCE: &str = "Electricity EF source";
    pub const USES_DEFAULTS: &str = "Uses default values";
    pub const JUSTIFICATION: &str = "Default value justification";
    /// Single-cell `process = quantity; ...` form, read from hand-filled sheets.
    pub const ALLOCATIONS: &str = "Allocations";
    pub const QUALITY: &str = "Data quality";
    pub const VERIFICATION: &str = "Verification status";
    pub const EMBEDDED: &str = "Total embedded emissions";
    pub const SPECIFIC: &str = "Specific embedded emissions";

    pub const HEADER: [&str; 21] = [
        ID,
        NAME,
        CN_CODE,
        QUANTITY,
        UNIT,
        NON_CBAM,
        SUPPLIER,
        SUPPLIER_INSTALLATION,
        SUPPLIER_COUNTRY,
        ROUTE,
        DIRECT,
        INDIRECT,
        ELECTRICITY,
        ELECTRICITY_EF,
        ELECTRICITY_SOURCE,
        USES_DEFAULTS,
        JUSTIFICATION,
        QUALITY,
        VERIFICATION,
        EMBEDDED,
        SPECIFIC,
    ];
}

pub mod allocations {
    pub const TITLE: &str = "E.3 Precursor allocation to processes";
    pub const PRECURSOR: &str = "Allocating precursor ID";
    pub const PROCESS: &str = "Allocated process ID";
    pub const QUANTITY: &str = "Allocated quantity";

    pub const HEADER: [&str; 3] = [PRECURSOR, PROCESS, QUANTITY];
}

/// Free-text markers of the legacy per-precursor layout.
pub mod legacy {
    pub const TITLE: &str = "E.4 Purchased precursors (legacy layout)";
    pub const PRECURSOR: &str = "Purchased precursor";
    pub const NAME: &str = "Name of precursor";
    pub const QUANTITY: &str = "Total quantity";
    pub const SPECIFIC_DIRECT: &str = "Specific embedded direct emissions";
    pub const SPECIFIC_INDIRECT: &str = "Specific embedded indirect emissions";
    pub const ELECTRICITY: &str = "Electricity consumption";
    pub const ELECTRICITY_EF: &str = "Electricity emission factor";
    pub const ELECTRICITY_SOURCE: &str = "Source/method of electricity emission factor";
    pub const JUSTIFICATION: &str = "Justification for use of default values";
    pub const SUPPLIER_INSTALLATION: &str = "Supplier installation";
    pub const NOT_APPLICABLE: &str = "n.a.";
}

pub mod additional_summary {
    pub const TITLE: &str = "F.1 Additional emissions summary";
    pub const CO2: &str = "Total CO2";
    pub const N2O: &str = "Total N2O";
    pub const PFC: &str = "Total PFC";
    pub const BIOMASS: &str = "Total biomass CO2";
    pub const FOSSIL: &str = "Fossil CO2";
    pub const CO2E: &str = "CO2 equivalent";
    pub const GHG: &str = "Total GHG";
}

pub mod additional {
    pub const TITLE: &str = "F.2 Additional emission sources";
    pub const ID: &str = "Entry ID";
    pub const NAME: &str = "Entry name";
    pub const CATEGORY: &str = "Source category";
    pub const CO2: &str = "CO2";
    pub const N2O: &str = "N2O";
    pub const PFC: &str = "PFC";
    pub const BIOMASS: &str = "Biomass CO2";
    pub const METHOD: &str = "Determination method";
    pub const ACTIVITY: &str = "Activity data";
    pub const ACTIVITY_UNIT: &str = "Activity data unit";
    pub const ACTIVITY_SOURCE: &str = "Activity data source";
    pub const ACTIVITY_UNCERTAINTY: &str = "Activity data uncertainty";
    pub const EF: &str = "Emission factor";
    pub const EF_UNIT: &str = "Emission factor unit";
    pub const EF_SOURCE: &str = "Emission factor source";
    pub const EF_UNCERTAINTY: &str = "Emission factor uncertainty";
    pub const BIOMASS_FRACTION: &str = "Biomass fraction";
    pub const UNCERTAINTY: &str = "Overall uncertainty";
    pub const QUALITY: &str = "Data quality";
    pub const VERIFICATION: &str = "Verification status";
    pub const CO2E: &str = "CO2 equivalent";

    pub const HEADER: [&str; 21] = [
        ID,
        NAME,
        CATEGORY,
        CO2,
        N2O,
        PFC,
        BIOMASS,
        METHOD,
        ACTIVITY,
        ACTIVITY_UNIT,
        ACTIVITY_SOURCE,
        ACTIVITY_UNCERTAINTY,
        EF,
        EF_UNIT,
        EF_SOURCE,
        EF_UNCERTAINTY,
        BIOMASS_FRACTION,
        UNCERTAINTY,
        QUALITY,
        VERIFICATION,
        CO2E,
    ];
}
