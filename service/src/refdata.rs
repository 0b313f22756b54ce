//! Static reference tables for rendering responses.

/// Full state name for a USPS code, including the non-state jurisdictions
/// that seat delegates. Unknown codes pass through verbatim.
#[must_use]
pub fn state_name(code: &str) -> &str {
    match code {
        "AL" => "Alabama",
        "AK" => "Alaska",
        "AZ" => "Arizona",
        "AR" => "Arkansas",
        "CA" => "California",
        "CO" => "Colorado",
        "CT" => "Connecticut",
        "DE" => "Delaware",
        "FL" => "Florida",
        "GA" => "Georgia",
        "HI" => "Hawaii",
        "ID" => "Idaho",
        "IL" => "Illinois",
        "IN" => "Indiana",
        "IA" => "Iowa",
        "KS" => "Kansas",
        "KY" => "Kentucky",
        "LA" => "Louisiana",
        "ME" => "Maine",
        "MD" => "Maryland",
        "MA" => "Massachusetts",
        "MI" => "Michigan",
        "MN" => "Minnesota",
        "MS" => "Mississippi",
        "MO" => "Missouri",
        "MT" => "Montana",
        "NE" => "Nebraska",
        "NV" => "Nevada",
        "NH" => "New Hampshire",
        "NJ" => "New Jersey",
        "NM" => "New Mexico",
        "NY" => "New York",
        "NC" => "North Carolina",
        "ND" => "North Dakota",
        "OH" => "Ohio",
        "OK" => "Oklahoma",
        "OR" => "Oregon",
        "PA" => "Pennsylvania",
        "RI" => "Rhode Island",
        "SC" => "South Carolina",
        "SD" => "South Dakota",
        "TN" => "Tennessee",
        "TX" => "Texas",
        "UT" => "Utah",
        "VT" => "Vermont",
        "VA" => "Virginia",
        "WA" => "Washington",
        "WV" => "West Virginia",
        "WI" => "Wisconsin",
        "WY" => "Wyoming",
        "DC" => "District of Columbia",
        "PR" => "Puerto Rico",
        "GU" => "Guam",
        "VI" => "Virgin Islands",
        "AS" => "American Samoa",
        "MP" => "Northern Mariana Islands",
        other => other,
    }
}

/// Title for a chamber, matched case-insensitively since stored chamber
/// values vary in casing. Unknown chambers pass through.
#[must_use]
pub fn position(chamber: &str) -> &str {
    if chamber.eq_ignore_ascii_case("senate") {
        "Senator"
    } else if chamber.eq_ignore_ascii_case("house") {
        "Representative"
    } else {
        chamber
    }
}

/// Expand a stored vote code to its display text. Unknown codes pass
/// through so new codes degrade to their raw form instead of erroring.
#[must_use]
pub fn vote_text(code: &str) -> &str {
    match code {
        "Y" => "Yea",
        "N" => "Nay",
        "NV" => "Not Voting",
        "P" => "Present",
        other => other,
    }
}
