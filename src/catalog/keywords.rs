use crate::game::pick;

/// Keyword pools for the Liar variant: (category, words)
pub const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Jobs",
        &[
            "Doctor", "Lawyer", "Teacher", "Chef", "Police officer", "Firefighter", "Singer",
            "Actor", "Programmer", "Designer",
        ],
    ),
    (
        "Animals",
        &[
            "Dog", "Cat", "Elephant", "Giraffe", "Lion", "Tiger", "Rabbit", "Hamster", "Parrot",
            "Goldfish",
        ],
    ),
    (
        "Food",
        &[
            "Pizza", "Fried chicken", "Hamburger", "Tteokbokki", "Kimchi stew", "Spaghetti",
            "Sushi", "Ramen", "Pork belly", "Bibimbap",
        ],
    ),
    (
        "Countries",
        &[
            "Korea", "United States", "Japan", "China", "France", "United Kingdom", "Germany",
            "Italy", "Spain", "Australia",
        ],
    ),
    (
        "Sports",
        &[
            "Soccer", "Baseball", "Basketball", "Volleyball", "Tennis", "Golf", "Swimming",
            "Taekwondo", "Boxing", "Table tennis",
        ],
    ),
    (
        "Fruit",
        &[
            "Apple", "Banana", "Grape", "Strawberry", "Watermelon", "Orange", "Kiwi", "Mango",
            "Peach", "Cherry",
        ],
    ),
    (
        "Colors",
        &[
            "Red", "Blue", "Yellow", "Green", "Black", "White", "Purple", "Pink", "Orange", "Gray",
        ],
    ),
    (
        "Transport",
        &[
            "Car", "Bus", "Subway", "Airplane", "Train", "Ship", "Bicycle", "Motorcycle", "Taxi",
            "Helicopter",
        ],
    ),
    (
        "Appliances",
        &[
            "Refrigerator", "Washing machine", "Microwave", "Air conditioner", "Vacuum", "TV",
            "Computer", "Smartphone", "Fan", "Air purifier",
        ],
    ),
    (
        "Seasons & Weather",
        &[
            "Spring", "Summer", "Autumn", "Winter", "Rain", "Snow", "Wind", "Typhoon", "Rainbow",
            "Lightning",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKeyword {
    pub category: String,
    pub keyword: String,
}

/// Category names a secret keyword can be drawn from
pub fn categories() -> impl Iterator<Item = &'static str> {
    KEYWORDS.iter().map(|(category, _)| *category)
}

/// Picks a category uniformly, then a word uniformly within it.
pub fn random_keyword() -> SecretKeyword {
    let (category, words) = pick(KEYWORDS).copied().unwrap_or(KEYWORDS[0]);
    let keyword = pick(words).copied().unwrap_or(words[0]);
    SecretKeyword {
        category: category.to_string(),
        keyword: keyword.to_string(),
    }
}

/// Case-insensitive, whitespace-trimmed comparison of a guess with the secret.
pub fn guess_matches(guess: &str, keyword: &str) -> bool {
    guess.trim().to_lowercase() == keyword.trim().to_lowercase()
}
