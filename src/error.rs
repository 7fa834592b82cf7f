use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record: {0}")]
    Malformed(#[from] csv::Error),
    #[error("administrator record is missing")]
    MissingAdmin,
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("required field is empty")]
    EmptyField,
    #[error("invalid price: {0}")]
    InvalidPrice(f64),
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("cashier already exists: {0}")]
    CashierExists(String),
    #[error("cashier not found: {0}")]
    CashierNotFound(String),
    #[error("old password does not match")]
    PasswordMismatch,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
    #[error("product not in cart: {0}")]
    NotInCart(String),
    #[error("cart is empty")]
    EmptyCart,
    #[error(transparent)]
    Store(#[from] StoreError),
}
