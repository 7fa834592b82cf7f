use serde::{Deserialize, Serialize, Serializer};

/// The closed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Electronics,
    Groceries,
    Clothing,
    HomeKitchen,
    Sports,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Groceries,
        Category::Clothing,
        Category::HomeKitchen,
        Category::Sports,
    ];

    const NAMES: [&'static str; 5] =
        ["Electronics", "Groceries", "Clothing", "Home & Kitchen", "Sports"];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Groceries => "Groceries",
            Category::Clothing => "Clothing",
            Category::HomeKitchen => "Home & Kitchen",
            Category::Sports => "Sports",
        }
    }

    /// Exact match on the display name, ignoring surrounding whitespace.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        Self::ALL.into_iter().find(|c| c.as_str() == trimmed)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Credential {
    #[serde(deserialize_with = "trim_string")]
    pub username: String,
    #[serde(deserialize_with = "trim_string")]
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn default_admin() -> Self {
        Self::new("admin", "admin123")
    }

    // The single place credentials are compared, so a hashed scheme can be
    // swapped in without touching call sites.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password_matches(password)
    }

    pub fn password_matches(&self, password: &str) -> bool {
        self.password == password
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Product {
    #[serde(deserialize_with = "trim_string")]
    pub id: String,
    #[serde(deserialize_with = "trim_string")]
    pub name: String,
    #[serde(
        deserialize_with = "trim_and_parse_category",
        serialize_with = "serialize_category"
    )]
    pub category: Category,
    #[serde(
        deserialize_with = "trim_and_parse_f64_2dp",
        serialize_with = "serialize_f64_2dp"
    )]
    pub price: f64,
    #[serde(deserialize_with = "trim_and_parse_u32")]
    pub quantity: u32,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            price,
            quantity,
        }
    }
}

/// One appended line per completed sale; line items are not retained.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SaleRecord {
    #[serde(deserialize_with = "trim_string")]
    pub timestamp: String,
    #[serde(
        deserialize_with = "trim_and_parse_f64_2dp",
        serialize_with = "serialize_f64_2dp"
    )]
    pub total: f64,
}

impl SaleRecord {
    pub fn now(total: f64) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            total,
        }
    }
}

/// A cart entry joined against the current catalog; `price` is per unit.
#[derive(Debug, PartialEq, Clone)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

pub fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn trim_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    Ok(s.trim().to_owned())
}

fn trim_and_parse_category<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    Category::parse(trimmed)
        .ok_or_else(|| serde::de::Error::unknown_variant(trimmed, &Category::NAMES))
}

fn trim_and_parse_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    trimmed.parse::<u32>().map_err(serde::de::Error::custom)
}

fn trim_and_parse_f64_2dp<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = String::deserialize(deserializer)?;
    let value: f64 = s.trim().parse().map_err(serde::de::Error::custom)?;
    Ok(round_2dp(value))
}

fn serialize_category<S>(value: &Category, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_str())
}

fn serialize_f64_2dp<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{:.2}", round_2dp(*value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_products(data: &str) -> Result<Vec<Product>, csv::Error> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(data.as_bytes())
            .deserialize()
            .collect()
    }

    fn write_product(product: &Product) -> String {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.serialize(product).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn parse_product_line_trims_fields() {
        let products = read_products(" E001 , Smartphone , Electronics , 599.99 , 10\n").unwrap();

        assert_eq!(
            products,
            vec![Product::new("E001", "Smartphone", Category::Electronics, 599.99, 10)]
        );
    }

    #[test]
    fn unknown_category_rejects_whole_line() {
        let result = read_products("E001,Smartphone,Gadgets,599.99,10\n");

        assert!(result.is_err());
    }

    #[test]
    fn negative_quantity_rejects_whole_line() {
        let result = read_products("E001,Smartphone,Electronics,599.99,-3\n");

        assert!(result.is_err());
    }

    #[test]
    fn home_and_kitchen_round_trips_with_spaced_name() {
        let product = Product::new("H001", "Blender", Category::HomeKitchen, 79.99, 8);

        let line = write_product(&product);
        assert_eq!(line, "H001,Blender,Home & Kitchen,79.99,8\n");

        let reread = read_products(&line).unwrap();
        assert_eq!(reread, vec![product]);
    }

    #[test]
    fn price_serializes_with_two_decimals() {
        let product = Product::new("G001", "Milk", Category::Groceries, 4.0, 50);

        assert_eq!(write_product(&product), "G001,Milk,Groceries,4.00,50\n");
    }

    #[test]
    fn payment_method_parse_is_case_insensitive() {
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse(" CARD "), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("Cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("voucher"), None);
    }

    #[test]
    fn category_parse_requires_exact_name() {
        assert_eq!(Category::parse(" Home & Kitchen "), Some(Category::HomeKitchen));
        assert_eq!(Category::parse("home & kitchen"), None);
        assert_eq!(Category::parse("Gadgets"), None);
    }

    #[test]
    fn line_total_multiplies_unit_price() {
        let item = CartItem {
            id: "G002".to_owned(),
            name: "Bread".to_owned(),
            category: Category::Groceries,
            price: 2.99,
            quantity: 3,
        };

        assert_eq!(round_2dp(item.line_total()), 8.97);
    }
}
