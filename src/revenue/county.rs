// County lookup - first two digits of a County District Code

/// Returned for codes outside 01-39
pub const UNKNOWN_COUNTY: &str = "Unknown";

const COUNTIES: [&str; 39] = [
    "Adams",
    "Asotin",
    "Benton",
    "Chelan",
    "Clallam",
    "Clark",
    "Columbia",
    "Cowlitz",
    "Douglas",
    "Ferry",
    "Franklin",
    "Garfield",
    "Grant",
    "Grays Harbor",
    "Island",
    "Jefferson",
    "King",
    "Kitsap",
    "Kittitas",
    "Klickitat",
    "Lewis",
    "Lincoln",
    "Mason",
    "Okanogan",
    "Pacific",
    "Pend Oreille",
    "Pierce",
    "San Juan",
    "Skagit",
    "Skamania",
    "Snohomish",
    "Spokane",
    "Stevens",
    "Thurston",
    "Wahkiakum",
    "Walla Walla",
    "Whatcom",
    "Whitman",
    "Yakima",
];

/// Leading two characters of a district code (the whole code if shorter)
pub fn county_code(county_district_code: &str) -> &str {
    match county_district_code.char_indices().nth(2) {
        Some((idx, _)) => &county_district_code[..idx],
        None => county_district_code,
    }
}

/// County name for a two-digit, zero-padded county code
pub fn county_name(code: &str) -> &'static str {
    let bytes = code.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
        return UNKNOWN_COUNTY;
    }

    let number = ((bytes[0] - b'0') * 10 + (bytes[1] - b'0')) as usize;
    match number {
        1..=39 => COUNTIES[number - 1],
        _ => UNKNOWN_COUNTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_county_code() {
        assert_eq!(county_code("17001"), "17");
        assert_eq!(county_code("06037"), "06");
        assert_eq!(county_code("3"), "3");
        assert_eq!(county_code(""), "");
    }

    #[test]
    fn test_county_name_known() {
        assert_eq!(county_name("01"), "Adams");
        assert_eq!(county_name("06"), "Clark");
        assert_eq!(county_name("17"), "King");
        assert_eq!(county_name("27"), "Pierce");
        assert_eq!(county_name("39"), "Yakima");
    }

    #[test]
    fn test_county_name_unknown() {
        assert_eq!(county_name("00"), UNKNOWN_COUNTY);
        assert_eq!(county_name("40"), UNKNOWN_COUNTY);
        assert_eq!(county_name("6"), UNKNOWN_COUNTY);
        assert_eq!(county_name("1A"), UNKNOWN_COUNTY);
        assert_eq!(county_name(""), UNKNOWN_COUNTY);
    }

    #[test]
    fn test_table_covers_every_code() {
        for n in 1..=39 {
            assert_ne!(county_name(&format!("{:02}", n)), UNKNOWN_COUNTY);
        }
    }
}
