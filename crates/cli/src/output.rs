//! Terminal output: notifications and record tables.

#![allow(clippy::print_stdout)]

use cue_shop_core::{CartItem, Order, Product, Supplier, User};
use cue_shop_storefront::notify::{Notice, NoticeLevel, Notifier};
use cue_shop_storefront::orders::ProgressStep;

/// Prints notifications as they are raised.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let marker = match notice.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Info => "•",
            NoticeLevel::Error => "✗",
        };
        println!("{marker} {}", notice.message);
    }
}

pub fn line(text: &str) {
    println!("{text}");
}

pub fn heading(title: &str) {
    println!("\n== {title} ==");
}

pub fn user(user: &User) {
    println!("Tài khoản:  {}", user.username);
    println!("Họ tên:     {}", user.display_name());
    println!("Vai trò:    {}", user.role.map_or("-", |r| r.as_str()));
    println!("Email:      {}", user.email.as_deref().unwrap_or("-"));
    println!("Điện thoại: {}", user.phone_number.as_deref().unwrap_or("-"));
    println!("Địa chỉ:    {}", user.address.as_deref().unwrap_or("-"));
}

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("(không có sản phẩm)");
        return;
    }
    for p in products {
        let stock = if p.in_stock() {
            format!("còn {}", p.quantity_in_stock)
        } else {
            "hết hàng".to_string()
        };
        println!("#{:<5} {:<40} {:>16}  [{}] {stock}", p.id, p.name, p.price, p.category_name());
    }
}

pub fn product(p: &Product) {
    println!("#{} {}", p.id, p.name);
    println!("Giá:      {}", p.price);
    if let Some(original) = p.original_price {
        println!("Giá gốc:  {original}");
    }
    println!("Danh mục: {}", p.category_name());
    println!("Tồn kho:  {}", p.quantity_in_stock);
    if let Some(supplier) = &p.supplier {
        println!("NCC:      {supplier}");
    }
    if let Some(description) = &p.description {
        println!("\n{description}");
    }
}

pub fn cart(items: &[CartItem], total: cue_shop_core::Price) {
    if items.is_empty() {
        println!("Giỏ hàng trống");
        return;
    }
    for item in items {
        println!(
            "#{:<5} {:<40} {:>4} × {:>14} = {:>16}",
            item.product_id,
            item.name,
            item.quantity,
            item.price,
            item.line_total()
        );
    }
    println!("Tổng cộng: {total}");
}

pub fn orders(orders: &[&Order]) {
    if orders.is_empty() {
        println!("(không có đơn hàng)");
        return;
    }
    for o in orders {
        let placed = o
            .created_at
            .map_or_else(|| "-".to_string(), |t| t.format("%d/%m/%Y %H:%M").to_string());
        let customer = o.customer_display_name().unwrap_or("");
        println!(
            "#{:<6} {placed:<17} {:<14} {:>16}  {customer}",
            o.id,
            o.status.label(),
            o.total()
        );
    }
}

pub fn order(order: &Order, progress: Option<&[ProgressStep]>) {
    println!("Đơn hàng #{} - {}", order.id, order.status.label());
    if let Some(placed) = order.created_at {
        println!("Ngày đặt:   {}", placed.format("%d/%m/%Y %H:%M"));
    }
    if let Some(name) = order.customer_display_name() {
        println!("Khách hàng: {name}");
    }
    println!("Địa chỉ:    {}", order.delivery_address().unwrap_or("-"));
    println!("Điện thoại: {}", order.phone.as_deref().or(order.customer_phone.as_deref()).unwrap_or("-"));
    if let Some(method) = &order.payment_method {
        println!("Thanh toán: {method}");
    }
    if let Some(steps) = progress {
        let bar: Vec<String> = steps
            .iter()
            .map(|s| {
                let mark = if s.active {
                    "●"
                } else if s.completed {
                    "✓"
                } else {
                    "○"
                };
                format!("{mark} {}", s.label)
            })
            .collect();
        println!("{}", bar.join(" → "));
    }
    for line in &order.items {
        println!("  {:<40} × {:<4} {:>16}", line.name(), line.quantity, line.line_total());
    }
    println!("Tổng cộng: {}", order.total());
}

pub fn suppliers(suppliers: &[Supplier]) {
    if suppliers.is_empty() {
        println!("(không có nhà cung cấp)");
        return;
    }
    for s in suppliers {
        println!("#{:<5} {:<30} {}", s.id, s.name, s.contact_info.as_deref().unwrap_or(""));
    }
}
