//! Region (state / province / land) code tables per country
//!
//! Codes are the ISO 3166-2 subdivision suffix, the form vendors emit in
//! `region_code`-style fields. Coverage is the set of countries the upstream
//! providers commonly disambiguate regions for; anything else resolves to
//! `None` and the caller keeps whatever the vendor sent.
//!
//! Known ambiguous names: "Georgia" (US state vs. country) is only looked up
//! within a country context, so it stays unambiguous here.

/// (country alpha-2, region code, region name)
pub const REGIONS: &[(&str, &str, &str)] = &[
    // United States
    ("US", "AL", "Alabama"),
    ("US", "AK", "Alaska"),
    ("US", "AZ", "Arizona"),
    ("US", "AR", "Arkansas"),
    ("US", "CA", "California"),
    ("US", "CO", "Colorado"),
    ("US", "CT", "Connecticut"),
    ("US", "DE", "Delaware"),
    ("US", "DC", "District of Columbia"),
    ("US", "FL", "Florida"),
    ("US", "GA", "Georgia"),
    ("US", "HI", "Hawaii"),
    ("US", "ID", "Idaho"),
    ("US", "IL", "Illinois"),
    ("US", "IN", "Indiana"),
    ("US", "IA", "Iowa"),
    ("US", "KS", "Kansas"),
    ("US", "KY", "Kentucky"),
    ("US", "LA", "Louisiana"),
    ("US", "ME", "Maine"),
    ("US", "MD", "Maryland"),
    ("US", "MA", "Massachusetts"),
    ("US", "MI", "Michigan"),
    ("US", "MN", "Minnesota"),
    ("US", "MS", "Mississippi"),
    ("US", "MO", "Missouri"),
    ("US", "MT", "Montana"),
    ("US", "NE", "Nebraska"),
    ("US", "NV", "Nevada"),
    ("US", "NH", "New Hampshire"),
    ("US", "NJ", "New Jersey"),
    ("US", "NM", "New Mexico"),
    ("US", "NY", "New York"),
    ("US", "NC", "North Carolina"),
    ("US", "ND", "North Dakota"),
    ("US", "OH", "Ohio"),
    ("US", "OK", "Oklahoma"),
    ("US", "OR", "Oregon"),
    ("US", "PA", "Pennsylvania"),
    ("US", "RI", "Rhode Island"),
    ("US", "SC", "South Carolina"),
    ("US", "SD", "South Dakota"),
    ("US", "TN", "Tennessee"),
    ("US", "TX", "Texas"),
    ("US", "UT", "Utah"),
    ("US", "VT", "Vermont"),
    ("US", "VA", "Virginia"),
    ("US", "WA", "Washington"),
    ("US", "WV", "West Virginia"),
    ("US", "WI", "Wisconsin"),
    ("US", "WY", "Wyoming"),
    ("US", "PR", "Puerto Rico"),
    // Canada
    ("CA", "AB", "Alberta"),
    ("CA", "BC", "British Columbia"),
    ("CA", "MB", "Manitoba"),
    ("CA", "NB", "New Brunswick"),
    ("CA", "NL", "Newfoundland and Labrador"),
    ("CA", "NS", "Nova Scotia"),
    ("CA", "NT", "Northwest Territories"),
    ("CA", "NU", "Nunavut"),
    ("CA", "ON", "Ontario"),
    ("CA", "PE", "Prince Edward Island"),
    ("CA", "QC", "Quebec"),
    ("CA", "SK", "Saskatchewan"),
    ("CA", "YT", "Yukon"),
    // Australia
    ("AU", "ACT", "Australian Capital Territory"),
    ("AU", "NSW", "New South Wales"),
    ("AU", "NT", "Northern Territory"),
    ("AU", "QLD", "Queensland"),
    ("AU", "SA", "South Australia"),
    ("AU", "TAS", "Tasmania"),
    ("AU", "VIC", "Victoria"),
    ("AU", "WA", "Western Australia"),
    // Germany
    ("DE", "BW", "Baden-Wurttemberg"),
    ("DE", "BY", "Bavaria"),
    ("DE", "BE", "Berlin"),
    ("DE", "BB", "Brandenburg"),
    ("DE", "HB", "Bremen"),
    ("DE", "HH", "Hamburg"),
    ("DE", "HE", "Hesse"),
    ("DE", "MV", "Mecklenburg-Vorpommern"),
    ("DE", "NI", "Lower Saxony"),
    ("DE", "NW", "North Rhine-Westphalia"),
    ("DE", "RP", "Rhineland-Palatinate"),
    ("DE", "SL", "Saarland"),
    ("DE", "SN", "Saxony"),
    ("DE", "ST", "Saxony-Anhalt"),
    ("DE", "SH", "Schleswig-Holstein"),
    ("DE", "TH", "Thuringia"),
    // France (metropolitan regions)
    ("FR", "ARA", "Auvergne-Rhone-Alpes"),
    ("FR", "BFC", "Bourgogne-Franche-Comte"),
    ("FR", "BRE", "Brittany"),
    ("FR", "CVL", "Centre-Val de Loire"),
    ("FR", "COR", "Corsica"),
    ("FR", "GES", "Grand Est"),
    ("FR", "HDF", "Hauts-de-France"),
    ("FR", "IDF", "Ile-de-France"),
    ("FR", "NOR", "Normandy"),
    ("FR", "NAQ", "Nouvelle-Aquitaine"),
    ("FR", "OCC", "Occitanie"),
    ("FR", "PDL", "Pays de la Loire"),
    ("FR", "PAC", "Provence-Alpes-Cote d'Azur"),
    // United Kingdom
    ("GB", "ENG", "England"),
    ("GB", "NIR", "Northern Ireland"),
    ("GB", "SCT", "Scotland"),
    ("GB", "WLS", "Wales"),
    // Switzerland (cantons)
    ("CH", "AG", "Aargau"),
    ("CH", "AR", "Appenzell Ausserrhoden"),
    ("CH", "AI", "Appenzell Innerrhoden"),
    ("CH", "BL", "Basel-Landschaft"),
    ("CH", "BS", "Basel-Stadt"),
    ("CH", "BE", "Bern"),
    ("CH", "FR", "Fribourg"),
    ("CH", "GE", "Geneva"),
    ("CH", "GL", "Glarus"),
    ("CH", "GR", "Graubunden"),
    ("CH", "JU", "Jura"),
    ("CH", "LU", "Lucerne"),
    ("CH", "NE", "Neuchatel"),
    ("CH", "NW", "Nidwalden"),
    ("CH", "OW", "Obwalden"),
    ("CH", "SH", "Schaffhausen"),
    ("CH", "SZ", "Schwyz"),
    ("CH", "SO", "Solothurn"),
    ("CH", "SG", "St. Gallen"),
    ("CH", "TG", "Thurgau"),
    ("CH", "TI", "Ticino"),
    ("CH", "UR", "Uri"),
    ("CH", "VS", "Valais"),
    ("CH", "VD", "Vaud"),
    ("CH", "ZG", "Zug"),
    ("CH", "ZH", "Zurich"),
    // Italy (regions)
    ("IT", "65", "Abruzzo"),
    ("IT", "77", "Basilicata"),
    ("IT", "78", "Calabria"),
    ("IT", "72", "Campania"),
    ("IT", "45", "Emilia-Romagna"),
    ("IT", "36", "Friuli-Venezia Giulia"),
    ("IT", "62", "Lazio"),
    ("IT", "42", "Liguria"),
    ("IT", "25", "Lombardy"),
    ("IT", "57", "Marche"),
    ("IT", "67", "Molise"),
    ("IT", "21", "Piedmont"),
    ("IT", "75", "Apulia"),
    ("IT", "88", "Sardinia"),
    ("IT", "82", "Sicily"),
    ("IT", "52", "Tuscany"),
    ("IT", "32", "Trentino-South Tyrol"),
    ("IT", "55", "Umbria"),
    ("IT", "23", "Aosta Valley"),
    ("IT", "34", "Veneto"),
    // Spain (autonomous communities)
    ("ES", "AN", "Andalusia"),
    ("ES", "AR", "Aragon"),
    ("ES", "AS", "Asturias"),
    ("ES", "IB", "Balearic Islands"),
    ("ES", "PV", "Basque Country"),
    ("ES", "CN", "Canary Islands"),
    ("ES", "CB", "Cantabria"),
    ("ES", "CL", "Castile and Leon"),
    ("ES", "CM", "Castilla-La Mancha"),
    ("ES", "CT", "Catalonia"),
    ("ES", "EX", "Extremadura"),
    ("ES", "GA", "Galicia"),
    ("ES", "RI", "La Rioja"),
    ("ES", "MD", "Madrid"),
    ("ES", "MC", "Murcia"),
    ("ES", "NC", "Navarre"),
    ("ES", "VC", "Valencia"),
    // Netherlands (provinces)
    ("NL", "DR", "Drenthe"),
    ("NL", "FL", "Flevoland"),
    ("NL", "FR", "Friesland"),
    ("NL", "GE", "Gelderland"),
    ("NL", "GR", "Groningen"),
    ("NL", "LI", "Limburg"),
    ("NL", "NB", "North Brabant"),
    ("NL", "NH", "North Holland"),
    ("NL", "OV", "Overijssel"),
    ("NL", "UT", "Utrecht"),
    ("NL", "ZE", "Zeeland"),
    ("NL", "ZH", "South Holland"),
    // Austria (states)
    ("AT", "1", "Burgenland"),
    ("AT", "2", "Carinthia"),
    ("AT", "3", "Lower Austria"),
    ("AT", "4", "Upper Austria"),
    ("AT", "5", "Salzburg"),
    ("AT", "6", "Styria"),
    ("AT", "7", "Tyrol"),
    ("AT", "8", "Vorarlberg"),
    ("AT", "9", "Vienna"),
    // Belgium (regions)
    ("BE", "BRU", "Brussels-Capital Region"),
    ("BE", "VLG", "Flanders"),
    ("BE", "WAL", "Wallonia"),
];

/// Region name for a (country, code) pair
#[must_use]
pub fn region_name(country: &str, code: &str) -> Option<&'static str> {
    let country = country.to_ascii_uppercase();
    let code = code.to_ascii_uppercase();
    REGIONS
        .iter()
        .find(|(c, rc, _)| *c == country && *rc == code)
        .map(|(_, _, name)| *name)
}

/// Region code for a (country, name) pair, case-insensitive
#[must_use]
pub fn region_code(country: &str, name: &str) -> Option<&'static str> {
    let country = country.to_ascii_uppercase();
    let name = name.trim().to_lowercase();
    REGIONS
        .iter()
        .find(|(c, _, rn)| *c == country && rn.to_lowercase() == name)
        .map(|(_, code, _)| *code)
}

/// True when the tables carry any regions for this country
#[must_use]
pub fn has_regions(country: &str) -> bool {
    let country = country.to_ascii_uppercase();
    REGIONS.iter().any(|(c, _, _)| *c == country)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_round_trips() {
        // regionCode(regionName(code, country), country) == code, for every row
        for (country, code, name) in REGIONS {
            assert_eq!(
                region_name(country, code),
                Some(*name),
                "{country}/{code}"
            );
            assert_eq!(
                region_code(country, name),
                Some(*code),
                "{country}/{name}"
            );
        }
    }

    #[test]
    fn test_region_lookup_is_country_scoped() {
        // "WA" means Washington in the US but Western Australia in AU
        assert_eq!(region_name("US", "WA"), Some("Washington"));
        assert_eq!(region_name("AU", "WA"), Some("Western Australia"));
        // "Georgia" only matches inside the US context
        assert_eq!(region_code("US", "Georgia"), Some("GA"));
        assert_eq!(region_code("CA", "Georgia"), None);
    }

    #[test]
    fn test_region_lookup_case_insensitive() {
        assert_eq!(region_code("ca", "ontario"), Some("ON"));
        assert_eq!(region_name("ca", "on"), Some("Ontario"));
    }

    #[test]
    fn test_unknown_region_is_none() {
        assert_eq!(region_name("US", "XX"), None);
        assert_eq!(region_code("JP", "Hokkaido"), None);
        assert!(!has_regions("JP"));
        assert!(has_regions("US"));
    }
}
