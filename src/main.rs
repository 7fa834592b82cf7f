//! Text-mode shell over the administrator and cashier operations. Holds no
//! business logic: it parses input, dispatches, and collapses every typed
//! error into a generic per-action message (the detail goes to the log).
//! One active session at a time; the store's read-check-rewrite span is not
//! locked, so concurrent terminals against one data directory are
//! unsupported.

use std::io::{self, Write};
use std::{env, error::Error};

use tracing::warn;

mod admin;
mod cashier;
mod error;
mod records;
mod seed;
mod store;

use admin::Admin;
use cashier::CashierSession;
use records::{CartItem, Category, PaymentMethod, Product};
use store::RecordStore;

fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();

    let args = parse_args();
    let store = RecordStore::open(&args.data_dir)?;
    println!("Data directory: {}", store.data_dir().display());
    if args.seed {
        seed::seed_sample_data(&store)?;
        println!("Sample data has been initialized successfully!");
        return Ok(());
    }

    loop {
        println!();
        println!("=== Point of Sale ===");
        println!("1) Administrator login");
        println!("2) Cashier login");
        println!("q) Quit");
        match prompt("Choice")?.as_str() {
            "1" => admin_login(&store)?,
            "2" => cashier_login(&store)?,
            "q" => break,
            _ => println!("Unknown choice."),
        }
    }

    Ok(())
}

struct Args {
    data_dir: String,
    seed: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    match args.as_slice() {
        [_, dir] => Args {
            data_dir: dir.clone(),
            seed: false,
        },
        [_, dir, flag] if flag == "--seed" => Args {
            data_dir: dir.clone(),
            seed: true,
        },
        _ => {
            eprintln!("Usage: {} <data-dir> [--seed]", args[0]);
            std::process::exit(1);
        }
    }
}

fn setup_tracing() {
    // Quiet by default so log lines do not interleave with the menus;
    // RUST_LOG=info opts in.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim().to_owned())
}

fn print_categories() {
    let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    println!("Categories: {}", names.join(", "));
}

/// Blank input means no filter; an unknown name aborts the action.
fn prompt_category_filter() -> io::Result<Result<Option<Category>, ()>> {
    print_categories();
    let input = prompt("Category (blank for all)")?;
    if input.is_empty() {
        return Ok(Ok(None));
    }
    match Category::parse(&input) {
        Some(category) => Ok(Ok(Some(category))),
        None => {
            println!("Unknown category.");
            Ok(Err(()))
        }
    }
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    for p in products {
        println!(
            "{:<6} {:<20} {:<15} {:>9} {:>5}",
            p.id,
            p.name,
            p.category,
            format!("${:.2}", p.price),
            p.quantity
        );
    }
}

fn print_cart(items: &[CartItem]) {
    if items.is_empty() {
        println!("Cart is empty.");
        return;
    }
    for item in items {
        println!(
            "{:<6} {:<20} {:>5} x {:>9} = {:>10}",
            item.id,
            item.name,
            item.quantity,
            format!("${:.2}", item.price),
            format!("${:.2}", item.line_total())
        );
    }
}

fn admin_login(store: &RecordStore) -> io::Result<()> {
    let admin = Admin::new(store.clone());
    let username = prompt("Username")?;
    let password = prompt("Password")?;
    match admin.login(&username, &password) {
        Ok(true) => admin_menu(&admin),
        Ok(false) => {
            println!("Invalid username or password!");
            Ok(())
        }
        Err(err) => {
            warn!(error = %err, "administrator login failed");
            println!("Login failed!");
            Ok(())
        }
    }
}

fn admin_menu(admin: &Admin) -> io::Result<()> {
    loop {
        println!();
        println!("--- Administrator ---");
        println!("1) List products");
        println!("2) Add or update product");
        println!("3) Remove product");
        println!("4) Update product quantity");
        println!("5) List cashiers");
        println!("6) Add cashier");
        println!("7) Remove cashier");
        println!("8) Sales log");
        println!("9) Change password");
        println!("b) Logout");
        match prompt("Choice")?.as_str() {
            "1" => admin_list_products(admin)?,
            "2" => admin_save_product(admin)?,
            "3" => admin_remove_product(admin)?,
            "4" => admin_update_quantity(admin)?,
            "5" => admin_list_cashiers(admin),
            "6" => admin_add_cashier(admin)?,
            "7" => admin_remove_cashier(admin)?,
            "8" => admin_list_sales(admin),
            "9" => admin_change_password(admin)?,
            "b" => return Ok(()),
            _ => println!("Unknown choice."),
        }
    }
}

fn admin_list_products(admin: &Admin) -> io::Result<()> {
    let Ok(filter) = prompt_category_filter()? else {
        return Ok(());
    };
    match admin.list_products(filter) {
        Ok(products) => print_products(&products),
        Err(err) => {
            warn!(error = %err, "product listing failed");
            println!("Failed to load products!");
        }
    }
    Ok(())
}

fn admin_save_product(admin: &Admin) -> io::Result<()> {
    let id = prompt("Product id")?;
    let name = prompt("Name")?;
    print_categories();
    let Some(category) = Category::parse(&prompt("Category")?) else {
        println!("Unknown category.");
        return Ok(());
    };
    let Ok(price) = prompt("Price")?.parse::<f64>() else {
        println!("Invalid price.");
        return Ok(());
    };
    let Ok(quantity) = prompt("Quantity")?.parse::<u32>() else {
        println!("Invalid quantity.");
        return Ok(());
    };

    match admin.upsert_product(&Product::new(id, name, category, price, quantity)) {
        Ok(()) => println!("Product saved successfully!"),
        Err(err) => {
            warn!(error = %err, "product save failed");
            println!("Failed to save product!");
        }
    }
    Ok(())
}

fn admin_remove_product(admin: &Admin) -> io::Result<()> {
    let id = prompt("Product id")?;
    match admin.remove_product(&id) {
        Ok(()) => println!("Product removed successfully!"),
        Err(err) => {
            warn!(error = %err, "product removal failed");
            println!("Failed to remove product!");
        }
    }
    Ok(())
}

fn admin_update_quantity(admin: &Admin) -> io::Result<()> {
    let id = prompt("Product id")?;
    let Ok(quantity) = prompt("Quantity")?.parse::<u32>() else {
        println!("Invalid quantity.");
        return Ok(());
    };
    match admin.update_product_quantity(&id, quantity) {
        Ok(()) => println!("Quantity updated successfully!"),
        Err(err) => {
            warn!(error = %err, "quantity update failed");
            println!("Failed to update quantity!");
        }
    }
    Ok(())
}

fn admin_list_cashiers(admin: &Admin) {
    match admin.list_cashiers() {
        Ok(cashiers) if cashiers.is_empty() => println!("No cashiers."),
        Ok(cashiers) => {
            for username in cashiers {
                println!("{username}");
            }
        }
        Err(err) => {
            warn!(error = %err, "cashier listing failed");
            println!("Failed to load cashiers!");
        }
    }
}

fn admin_add_cashier(admin: &Admin) -> io::Result<()> {
    let username = prompt("Username")?;
    let password = prompt("Password")?;
    match admin.add_cashier(&username, &password) {
        Ok(()) => println!("Cashier added successfully!"),
        Err(err) => {
            warn!(error = %err, "cashier add failed");
            println!("Failed to add cashier!");
        }
    }
    Ok(())
}

fn admin_remove_cashier(admin: &Admin) -> io::Result<()> {
    let username = prompt("Username")?;
    match admin.remove_cashier(&username) {
        Ok(()) => println!("Cashier removed successfully!"),
        Err(err) => {
            warn!(error = %err, "cashier removal failed");
            println!("Failed to remove cashier!");
        }
    }
    Ok(())
}

fn admin_list_sales(admin: &Admin) {
    match admin.list_sales() {
        Ok(sales) if sales.is_empty() => println!("No sales recorded."),
        Ok(sales) => {
            for sale in sales {
                println!("{}  ${:.2}", sale.timestamp, sale.total);
            }
        }
        Err(err) => {
            warn!(error = %err, "sales log listing failed");
            println!("Failed to load sales log!");
        }
    }
}

fn admin_change_password(admin: &Admin) -> io::Result<()> {
    let old = prompt("Old password")?;
    let new = prompt("New password")?;
    match admin.change_password(&old, &new) {
        Ok(()) => println!("Password changed successfully!"),
        Err(err) => {
            warn!(error = %err, "password change failed");
            println!("Failed to change password!");
        }
    }
    Ok(())
}

fn cashier_login(store: &RecordStore) -> io::Result<()> {
    let mut session = CashierSession::new(store.clone());
    let username = prompt("Username")?;
    let password = prompt("Password")?;
    match session.login(&username, &password) {
        Ok(true) => cashier_menu(&mut session),
        Ok(false) => {
            println!("Invalid username or password!");
            Ok(())
        }
        Err(err) => {
            warn!(error = %err, "cashier login failed");
            println!("Login failed!");
            Ok(())
        }
    }
}

fn cashier_menu(session: &mut CashierSession) -> io::Result<()> {
    loop {
        println!();
        println!("--- Cashier ---");
        println!("1) List products");
        println!("2) Add to cart");
        println!("3) Update cart quantity");
        println!("4) Remove from cart");
        println!("5) View cart");
        println!("6) Checkout");
        println!("7) Clear cart");
        println!("b) Logout");
        match prompt("Choice")?.as_str() {
            "1" => cashier_list_products(session)?,
            "2" => cashier_add_to_cart(session)?,
            "3" => cashier_update_quantity(session)?,
            "4" => cashier_remove_item(session)?,
            "5" => cashier_view_cart(session),
            "6" => cashier_checkout(session)?,
            "7" => {
                session.clear_cart();
                println!("Cart cleared.");
            }
            "b" => return Ok(()),
            _ => println!("Unknown choice."),
        }
    }
}

fn cashier_list_products(session: &CashierSession) -> io::Result<()> {
    let Ok(filter) = prompt_category_filter()? else {
        return Ok(());
    };
    match session.list_products(filter) {
        Ok(products) => print_products(&products),
        Err(err) => {
            warn!(error = %err, "product listing failed");
            println!("Failed to load products!");
        }
    }
    Ok(())
}

fn cashier_add_to_cart(session: &mut CashierSession) -> io::Result<()> {
    let id = prompt("Product id")?;
    let Ok(quantity) = prompt("Quantity")?.parse::<u32>() else {
        println!("Invalid quantity.");
        return Ok(());
    };
    match session.add_to_cart(&id, quantity) {
        Ok(()) => println!("Added to cart."),
        Err(err) => {
            warn!(error = %err, "add to cart failed");
            println!("Failed to add to cart!");
        }
    }
    Ok(())
}

fn cashier_update_quantity(session: &mut CashierSession) -> io::Result<()> {
    let id = prompt("Product id")?;
    let Ok(quantity) = prompt("Quantity (0 removes)")?.parse::<u32>() else {
        println!("Invalid quantity.");
        return Ok(());
    };
    match session.update_cart_quantity(&id, quantity) {
        Ok(()) => println!("Cart updated."),
        Err(err) => {
            warn!(error = %err, "cart update failed");
            println!("Failed to update cart!");
        }
    }
    Ok(())
}

fn cashier_remove_item(session: &mut CashierSession) -> io::Result<()> {
    let id = prompt("Product id")?;
    match session.remove_from_cart(&id) {
        Ok(()) => println!("Removed from cart."),
        Err(err) => {
            warn!(error = %err, "cart removal failed");
            println!("Failed to remove from cart!");
        }
    }
    Ok(())
}

fn cashier_view_cart(session: &CashierSession) {
    match session.cart_items() {
        Ok(items) => print_cart(&items),
        Err(err) => {
            warn!(error = %err, "cart listing failed");
            println!("Failed to load cart!");
        }
    }
}

fn cashier_checkout(session: &mut CashierSession) -> io::Result<()> {
    let Some(method) = PaymentMethod::parse(&prompt("Payment method (cash/card)")?) else {
        println!("Unknown payment method.");
        return Ok(());
    };
    match session.calculate_total(method) {
        Ok(total) => println!("Total due: ${total:.2}"),
        Err(err) => {
            warn!(error = %err, "total calculation failed");
            println!("Failed to calculate total!");
            return Ok(());
        }
    }
    if prompt("Confirm sale? (y/n)")? != "y" {
        println!("Sale cancelled.");
        return Ok(());
    }

    match session.checkout(method) {
        Ok(total) => println!("Sale completed. Charged ${total:.2}."),
        Err(err) => {
            warn!(error = %err, "checkout failed");
            println!("Failed to process sale!");
        }
    }
    Ok(())
}
