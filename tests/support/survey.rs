use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const HEADER: &str = "id,Gender,Age,City,Profession,Academic Pressure,Work Pressure,CGPA,Study Satisfaction,Job Satisfaction,Sleep Duration,Dietary Habits,Degree,Have you ever had suicidal thoughts ?,Work/Study Hours,Financial Stress,Family History of Mental Illness,Depression";

const CITIES: [&str; 5] = ["Agra", "Bangalore", "Delhi", "Pune", "Surat"];
const SLEEP: [&str; 4] = [
    "'5-6 hours'",
    "'7-8 hours'",
    "'Less than 5 hours'",
    "'More than 8 hours'",
];
const DIET: [&str; 3] = ["Healthy", "Moderate", "Unhealthy"];
const DEGREES: [&str; 5] = ["B.Pharm", "BA", "BSc", "Class 12", "MSc"];

/// Survey CSV with `rows` students whose label mostly follows pressure,
/// financial stress and suicidal thoughts.
///
/// Every 17th row has `?` for financial stress and every 23rd row leaves
/// dietary habits empty, so imputation always has work to do.
pub fn survey_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut text = String::from(HEADER);
    for i in 0..rows {
        let gender = if rng.random_bool(0.5) { "Male" } else { "Female" };
        let age = rng.random_range(18..=34);
        let city = CITIES[rng.random_range(0..CITIES.len())];
        let profession = if rng.random_bool(0.95) { "Student" } else { "Architect" };
        let academic: u32 = rng.random_range(0..=5);
        let cgpa = rng.random_range(500..=1000) as f64 / 100.0;
        let study: u32 = rng.random_range(0..=5);
        let sleep = SLEEP[rng.random_range(0..SLEEP.len())];
        let diet = if i % 23 == 5 {
            ""
        } else {
            DIET[rng.random_range(0..DIET.len())]
        };
        let degree = DEGREES[rng.random_range(0..DEGREES.len())];
        let suicidal = rng.random_bool(0.4);
        let hours: u32 = rng.random_range(0..=12);
        let financial: u32 = rng.random_range(1..=5);
        let family = if rng.random_bool(0.5) { "Yes" } else { "No" };

        let score = academic as f64 + financial as f64 + if suicidal { 3.0 } else { 0.0 }
            - 0.5 * study as f64;
        let noise = rng.random_range(-0.5..0.5);
        let label = u8::from(score + noise > 5.5);
        let financial_cell = if i % 17 == 3 {
            "?".to_string()
        } else {
            financial.to_string()
        };

        text.push_str(&format!(
            "\n{id},{gender},{age},{city},{profession},{academic},0,{cgpa:.2},{study},0,{sleep},{diet},{degree},{suicidal},{hours},{financial_cell},{family},{label}",
            id = i + 1,
            suicidal = if suicidal { "Yes" } else { "No" },
        ));
    }
    text.push('\n');
    text
}

pub fn write_survey(path: &Path, rows: usize, seed: u64) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create survey parent dirs");
    }
    std::fs::write(path, survey_csv(rows, seed)).expect("write survey csv");
}
