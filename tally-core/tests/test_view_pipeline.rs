use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::{
    Category, Filter, RecordStore, Session, Sort, SortField, SortOrder, Status, Transaction,
    TransactionFields, TransactionType, query, summarize,
};

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn tx(
    id: &str,
    day: NaiveDate,
    desc: &str,
    amount: Decimal,
    kind: TransactionType,
    category: Category,
    status: Status,
    counterparty: Option<&str>,
) -> Transaction {
    Transaction::new(TransactionFields {
        id: id.to_string(),
        date: day,
        description: desc.to_string(),
        amount,
        kind,
        category,
        status,
        counterparty: counterparty.map(str::to_string),
        due_date: (status == Status::Due).then(|| day + chrono::Duration::days(30)),
    })
    .unwrap()
}

/// A small book of entries with distinct dates, amounts, descriptions and ids.
fn ledger() -> Vec<Transaction> {
    use Category::*;
    use Status::*;
    use TransactionType::*;
    vec![
        tx("t01", date(1, 3), "January salary", dec!(3200), Income, Salary, Paid, Some("Acme Corp")),
        tx("t02", date(1, 5), "Apartment rent", dec!(1100), Expense, Rent, Paid, Some("Landlord")),
        tx("t03", date(1, 9), "Weekly groceries", dec!(86.45), Expense, Groceries, Paid, None),
        tx("t04", date(1, 15), "Logo for bakery", dec!(450), Income, ClientWork, Due, Some("Sweet Buns")),
        tx("t05", date(1, 20), "Electricity", dec!(72.10), Expense, Utilities, Due, Some("City Power")),
        tx("t06", date(2, 1), "Bus pass", dec!(40), Expense, Transportation, Paid, None),
        tx("t07", date(2, 3), "Dividend", dec!(12.5), Income, Investment, Paid, Some("Index Fund")),
        tx("t08", date(2, 11), "Figma seat", dec!(15), Expense, SoftwareTools, Due, Some("Figma")),
    ]
}

fn all_filters() -> Vec<Filter> {
    let mut out = vec![Filter::default()];
    for kind in TransactionType::ALL {
        out.push(Filter { kind: Some(kind), ..Filter::default() });
    }
    for status in Status::ALL {
        out.push(Filter { status: Some(status), ..Filter::default() });
    }
    for category in [Category::Rent, Category::ClientWork, Category::Taxes] {
        out.push(Filter { category: Some(category), ..Filter::default() });
    }
    for search in ["rent", "CITY", "12.5", "450", "nothing-matches"] {
        out.push(Filter { search: search.to_string(), ..Filter::default() });
    }
    out.push(Filter {
        start: Some(date(1, 9)),
        end: Some(date(2, 1)),
        ..Filter::default()
    });
    out.push(Filter {
        kind: Some(TransactionType::Expense),
        status: Some(Status::Due),
        start: Some(date(1, 1)),
        ..Filter::default()
    });
    out
}

#[test]
fn test_no_predicates_is_identity() {
    let records = ledger();
    let view = query::apply(&records, &Filter::default(), Sort::asc(SortField::Id));
    assert_eq!(view, records);
}

#[test]
fn test_filtered_view_is_subset_satisfying_every_predicate() {
    let records = ledger();
    for f in all_filters() {
        let view = query::filter(&records, &f);
        assert!(view.len() <= records.len());
        for t in &view {
            assert!(records.contains(t), "{} not in input", t.id());
            if let Some(k) = f.kind {
                assert_eq!(t.kind(), k);
            }
            if let Some(s) = f.status {
                assert_eq!(t.status(), s);
            }
            if let Some(c) = f.category {
                assert_eq!(t.category(), c);
            }
            if let Some(start) = f.start {
                assert!(t.date() >= start);
            }
            if let Some(end) = f.end {
                assert!(t.date() <= end);
            }
        }
        // nothing that matches was dropped
        let expected = records.iter().filter(|t| f.matches(t)).count();
        assert_eq!(view.len(), expected);
    }
}

#[test]
fn test_sort_is_a_permutation_and_desc_reverses_asc() {
    let records = ledger();
    // every record has a unique value for these fields
    let tie_free = [SortField::Id, SortField::Date, SortField::Description, SortField::Amount];

    for field in SortField::ALL {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let view = query::apply(&records, &Filter::default(), Sort::new(field, order));
            assert_eq!(view.len(), records.len());
            for t in &records {
                assert!(view.contains(t));
            }
        }

        if tie_free.contains(&field) {
            let mut asc = query::apply(&records, &Filter::default(), Sort::asc(field));
            let desc = query::apply(&records, &Filter::default(), Sort::desc(field));
            asc.reverse();
            assert_eq!(asc, desc, "field {field}");
        }
    }
}

#[test]
fn test_equal_keys_keep_input_order() {
    let records = ledger();
    let view = query::apply(&records, &Filter::default(), Sort::asc(SortField::Status));
    let ids: Vec<&str> = view.iter().map(|t| t.id()).collect();
    // due < paid, each group in insertion order
    assert_eq!(ids, vec!["t04", "t05", "t08", "t01", "t02", "t03", "t06", "t07"]);
}

#[test]
fn test_reference_example_filter_and_summary() {
    let records = vec![
        tx("i", date(3, 1), "Income", dec!(1000), TransactionType::Income, Category::Salary, Status::Paid, None),
        tx("e1", date(3, 2), "Owed", dec!(400), TransactionType::Expense, Category::Rent, Status::Due, None),
        tx("e2", date(3, 3), "Spent", dec!(100), TransactionType::Expense, Category::Groceries, Status::Paid, None),
    ];

    let expenses = query::filter(
        &records,
        &Filter {
            kind: Some(TransactionType::Expense),
            ..Filter::default()
        },
    );
    let ids: Vec<&str> = expenses.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec!["e1", "e2"]);

    let s = summarize(&records);
    assert_eq!(s.total_income, dec!(1000));
    assert_eq!(s.total_expenses, dec!(500));
    assert_eq!(s.net_balance, dec!(500));
    assert_eq!(s.total_user_owes, dec!(400));
    assert_eq!(s.total_due_to_user, dec!(0));
}

#[test]
fn test_session_summary_follows_the_filter() {
    let store = RecordStore::with_records(ledger()).unwrap();
    let mut session = Session::with_store(store, date(3, 1));

    let full = session.summary();
    assert_eq!(full.net_balance, full.total_income - full.total_expenses);
    assert_eq!(full.total_income, dec!(3662.5));

    session.set_filter(Filter {
        status: Some(Status::Due),
        ..Filter::default()
    });
    let due = session.summary();
    assert_eq!(due.total_income, dec!(450));
    assert_eq!(due.total_due_to_user, dec!(450));
    assert_eq!(due.total_user_owes, dec!(87.10));
    assert_eq!(session.view().len(), 3);

    session.reset_filter();
    assert_eq!(session.view().len(), 8);
}

#[test]
fn test_no_paid_record_has_a_due_date() {
    for t in ledger() {
        if t.status() == Status::Paid {
            assert!(t.due_date().is_none(), "{} is paid but has a due date", t.id());
        }
    }
}
