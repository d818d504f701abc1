use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Ordinal used for education levels the catalog does not recognise.
pub const UNKNOWN_EDUCATION_ORDINAL: u8 = 3;

/// Education levels in ascending order. Position + 1 is the ordinal.
const EDUCATION_LEVELS: &[(&str, &[&str])] = &[
    ("Primary School", &["primary", "elementary", "elementary school"]),
    ("Middle School", &["middle", "secondary school", "junior high"]),
    ("High School", &["high", "highschool", "secondary"]),
    ("Associate", &["associate degree", "associates", "vocational"]),
    ("Bachelor", &["bachelors", "bachelor's", "bachelor degree", "university", "ba", "bsc"]),
    ("Master", &["masters", "master's", "master degree", "ma", "msc", "mba"]),
    ("Doctorate", &["phd", "doctoral", "doctor"]),
];

const HOBBY_CATEGORIES: &[(&str, &[&str])] = &[
    ("Sports", &[
        "Football", "Basketball", "Volleyball", "Tennis", "Swimming", "Running", "Fitness",
        "Yoga", "Pilates", "Dance", "Boxing", "Kickboxing", "Wrestling", "Athletics",
        "Cycling", "Skiing", "Snowboarding", "Surfing", "Diving", "Climbing",
    ]),
    ("Arts", &[
        "Painting", "Drawing", "Photography", "Music", "Guitar", "Piano", "Singing",
        "Dance", "Theatre", "Cinema", "Writing", "Poetry", "Crafts",
        "Jewelry Making", "Sewing", "Knitting", "Ceramics", "Sculpture",
    ]),
    ("Technology", &[
        "Programming", "Web Design", "Mobile Apps", "Game Development",
        "Artificial Intelligence", "Data Analysis", "Cyber Security", "Blockchain",
        "Robotics", "Drones", "3D Printing", "Electronics",
    ]),
    ("Nature", &[
        "Camping", "Trekking", "Hiking", "Mountaineering", "Fishing",
        "Gardening", "Plant Growing", "Bird Watching", "Astronomy",
        "Fossil Hunting", "Mineral Collecting",
    ]),
    ("Travel", &[
        "Backpacking", "Culture Tours", "City Exploring", "Museum Visits",
        "Festivals", "Road Trips", "Language Learning", "Cultural Exchange",
    ]),
    ("Food", &[
        "Cooking", "Baking", "Coffee", "Wine", "Home Brewing",
        "Restaurant Hopping", "Food Photography", "Recipe Development",
    ]),
    ("Social", &[
        "Conversation", "Books", "Movies", "TV Series", "Podcasts",
        "Social Media", "Blogging", "Vlogging", "Community Events",
    ]),
    ("Learning", &[
        "Language Learning", "Courses", "Certificates", "Online Learning",
        "Books", "Research", "Teaching", "Mentoring",
    ]),
    ("Business", &[
        "Entrepreneurship", "Freelancing", "Networking", "Conferences",
        "Workshops", "Mentoring", "Consulting",
    ]),
    ("Other", &[
        "Collecting", "Puzzles", "Chess", "Poker", "Meditation",
        "Feng Shui", "Astrology", "Numerology", "Nature",
    ]),
];

const JOB_CATEGORIES: &[(&str, &[&str])] = &[
    ("Tech", &[
        "Software Developer", "Data Scientist", "System Administrator", "DevOps Engineer",
        "UI/UX Designer", "Project Manager", "QA Engineer", "Security Specialist",
    ]),
    ("Health", &[
        "Doctor", "Nurse", "Pharmacist", "Dentist", "Psychologist", "Physiotherapist",
        "Dietitian", "Veterinarian",
    ]),
    ("Education", &["Teacher", "Academic", "Instructor", "Coach", "Mentor", "Counselor"]),
    ("Finance", &[
        "Accountant", "Financial Analyst", "Investment Advisor", "Banker",
        "Insurance Agent", "Economist", "Actuary",
    ]),
    ("Law", &["Lawyer", "Judge", "Prosecutor", "Notary", "Legal Advisor"]),
    ("Media", &["Journalist", "Editor", "Author", "Reporter", "Publisher", "Content Creator"]),
    ("Arts", &["Musician", "Actor", "Director", "Artist", "Designer", "Photographer"]),
    ("Service", &[
        "Sales Representative", "Customer Service", "Marketing Specialist",
        "Human Resources", "Office Administrator", "Secretary",
    ]),
    ("Manufacturing", &["Engineer", "Technician", "Operator", "Quality Control", "Production Lead"]),
    ("Other", &["Freelancer", "Entrepreneur", "Civil Servant", "Worker", "Retired", "Student"]),
];

/// Read-only lookup tables for profile vocabulary.
///
/// Built once per process through [`Catalog::global`]; every key is stored
/// lower-cased so lookups are case-insensitive.
#[derive(Debug)]
pub struct Catalog {
    education: HashMap<String, u8>,
    hobby_to_categories: HashMap<String, BTreeSet<String>>,
    title_to_job_category: HashMap<String, String>,
    education_names: Vec<&'static str>,
    job_categories: Vec<&'static str>,
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// The process-wide catalog, built on first use.
    pub fn global() -> &'static Catalog {
        CATALOG.get_or_init(Catalog::build)
    }

    fn build() -> Self {
        let mut education = HashMap::new();
        for (index, (name, aliases)) in EDUCATION_LEVELS.iter().enumerate() {
            let ordinal = (index + 1) as u8;
            education.insert(name.to_lowercase(), ordinal);
            for alias in aliases.iter() {
                education.insert(alias.to_lowercase(), ordinal);
            }
        }

        let mut hobby_to_categories: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (category, hobbies) in HOBBY_CATEGORIES {
            for hobby in hobbies.iter() {
                hobby_to_categories
                    .entry(hobby.to_lowercase())
                    .or_default()
                    .insert(category.to_lowercase());
            }
        }

        let mut title_to_job_category = HashMap::new();
        for (category, titles) in JOB_CATEGORIES {
            for title in titles.iter() {
                title_to_job_category.insert(title.to_lowercase(), category.to_string());
            }
        }

        tracing::debug!(
            "Catalog built: {} education keys, {} hobbies, {} job titles",
            education.len(),
            hobby_to_categories.len(),
            title_to_job_category.len()
        );

        Self {
            education,
            hobby_to_categories,
            title_to_job_category,
            education_names: EDUCATION_LEVELS.iter().map(|(name, _)| *name).collect(),
            job_categories: JOB_CATEGORIES.iter().map(|(name, _)| *name).collect(),
        }
    }

    /// Ordinal (1-7) for a known education level or alias.
    pub fn education_ordinal(&self, level: &str) -> Option<u8> {
        self.education.get(level.trim().to_lowercase().as_str()).copied()
    }

    /// Ordinal for any level, falling back to [`UNKNOWN_EDUCATION_ORDINAL`].
    pub fn education_ordinal_or_default(&self, level: &str) -> u8 {
        self.education_ordinal(level).unwrap_or(UNKNOWN_EDUCATION_ORDINAL)
    }

    /// Lower-cased categories covering the given (lower-cased) hobbies.
    pub fn hobby_categories_for<'a, I>(&self, hobbies: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        hobbies
            .into_iter()
            .filter_map(|hobby| self.hobby_to_categories.get(hobby.as_str()))
            .flat_map(|categories| categories.iter().cloned())
            .collect()
    }

    pub fn job_category_for(&self, title: &str) -> Option<&str> {
        self.title_to_job_category
            .get(title.trim().to_lowercase().as_str())
            .map(String::as_str)
    }

    pub fn education_levels(&self) -> &[&'static str] {
        &self.education_names
    }

    pub fn job_categories(&self) -> &[&'static str] {
        &self.job_categories
    }
}
