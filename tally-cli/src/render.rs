use rust_decimal::Decimal;
use std::fmt::Write;
use tally_core::draft::DATE_FORMAT;
use tally_core::{Draft, Filter, ParsedTransaction, Sort, Summary, Transaction, TransactionType};

/// Width of the id column in tables; long enough to be a unique prefix in practice.
const SHORT_ID: usize = 8;

pub fn money(symbol: &str, amount: Decimal) -> String {
    format!("{symbol}{amount:.2}")
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID).unwrap_or(id)
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn table(view: &[Transaction], symbol: &str) -> String {
    if view.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8}  {:<10}  {:<28}  {:>12}  {:<17}  {:<4}  {}",
        "ID", "DATE", "DESCRIPTION", "AMOUNT", "CATEGORY", "", "COUNTERPARTY"
    );
    for t in view {
        let sign = match t.kind() {
            TransactionType::Income => "+",
            TransactionType::Expense => "-",
        };
        let status = if t.is_due() { "due" } else { "" };
        let _ = writeln!(
            out,
            "{:<8}  {:<10}  {:<28}  {:>12}  {:<17}  {:<4}  {}",
            short_id(t.id()),
            t.date().format(DATE_FORMAT),
            clip(t.description(), 28),
            format!("{sign}{}", money(symbol, t.amount())),
            t.category().label(),
            status,
            t.counterparty().unwrap_or_default(),
        );
    }
    out
}

pub fn detail(t: &Transaction, symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id:           {}", t.id());
    let _ = writeln!(out, "date:         {}", t.date().format(DATE_FORMAT));
    let _ = writeln!(out, "description:  {}", t.description());
    let _ = writeln!(out, "amount:       {}", money(symbol, t.amount()));
    let _ = writeln!(out, "type:         {}", t.kind());
    let _ = writeln!(out, "category:     {}", t.category());
    let _ = writeln!(out, "status:       {}", t.status());
    if let Some(cp) = t.counterparty() {
        let _ = writeln!(out, "counterparty: {cp}");
    }
    if let Some(d) = t.due_date() {
        let _ = writeln!(out, "due date:     {}", d.format(DATE_FORMAT));
    }
    out
}

pub fn summary(s: &Summary, symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Income:        {}", money(symbol, s.total_income));
    let _ = writeln!(out, "Expenses:      {}", money(symbol, s.total_expenses));
    let _ = writeln!(out, "Net balance:   {}", money(symbol, s.net_balance));
    let _ = writeln!(out, "Owed to you:   {}", money(symbol, s.total_due_to_user));
    let _ = writeln!(out, "You owe:       {}", money(symbol, s.total_user_owes));
    out
}

pub fn draft(d: &Draft, symbol: &str) -> String {
    let mut out = String::new();
    match d.editing_id() {
        Some(id) => {
            let _ = writeln!(out, "Editing {}", short_id(id));
        }
        None => {
            let _ = writeln!(out, "New entry");
        }
    }
    let _ = writeln!(out, "  description:  {}", d.description);
    let amount = d.amount.map(|a| money(symbol, a)).unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "  amount:       {amount}");
    let _ = writeln!(out, "  type:         {}", d.kind);
    let _ = writeln!(out, "  category:     {}", d.category);
    let _ = writeln!(out, "  status:       {}", d.status);
    let _ = writeln!(out, "  date:         {}", d.date.format(DATE_FORMAT));
    let _ = writeln!(out, "  counterparty: {}", d.counterparty);
    if let Some(due) = d.due_date {
        let _ = writeln!(out, "  due date:     {}", due.format(DATE_FORMAT));
    }
    out
}

pub fn parsed(p: &ParsedTransaction, symbol: &str) -> String {
    let mut out = format!(
        "Interpreted: {} {} ({}, {})",
        p.kind,
        money(symbol, p.amount),
        p.description,
        p.category()
    );
    if let Some(cp) = &p.counterparty {
        let _ = write!(out, " with {cp}");
    }
    out.push('\n');
    out
}

pub fn criteria(f: &Filter, s: Sort) -> String {
    let mut parts = Vec::new();
    if !f.search.trim().is_empty() {
        parts.push(format!("search=\"{}\"", f.search.trim()));
    }
    if let Some(k) = f.kind {
        parts.push(format!("type={k}"));
    }
    if let Some(c) = f.category {
        parts.push(format!("category={c}"));
    }
    if let Some(st) = f.status {
        parts.push(format!("status={st}"));
    }
    if let Some(d) = f.start {
        parts.push(format!("from={}", d.format(DATE_FORMAT)));
    }
    if let Some(d) = f.end {
        parts.push(format!("to={}", d.format(DATE_FORMAT)));
    }
    let filter = if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(" ")
    };
    format!("filter: {filter}; sort: {} {}\n", s.field, s.order.as_str())
}
