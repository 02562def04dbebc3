#![allow(missing_docs)]

mod common;

use hintlist::oracle::ReportBook;
use hintlist::registry::{RegistryOptions, Relation};
use hintlist::{Address, Fraction, RegistryError, RegistryKey, Result, FIXED1};

fn oracle(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn book_with_oracles(options: RegistryOptions, expiry: u64, count: u64) -> Result<ReportBook> {
    let mut book = ReportBook::new(options, expiry);
    for n in 1..=count {
        book.add_oracle(oracle(n))?;
    }
    Ok(book)
}

fn submit(book: &mut ReportBook, who: Address, rate: Fraction, now: u64) -> Result<()> {
    let hints = book.report_hints(who, rate)?;
    book.report(who, rate, now, hints)
}

#[test]
fn median_follows_a_rolling_set_of_reports() -> Result<()> {
    common::init_tracing();
    let mut book = book_with_oracles(RegistryOptions::default(), 300, 4)?;
    let rates = [
        Fraction::new(3, 2)?,
        Fraction::new(7, 5)?,
        Fraction::new(8, 5)?,
        Fraction::new(29, 20)?,
    ];
    for (offset, rate) in rates.iter().enumerate() {
        submit(&mut book, oracle(offset as u64 + 1), *rate, 1_000 + offset as u64)?;
    }
    // 1.6, 1.5, 1.45, 1.4: the median sits at index 1.
    assert_eq!(book.median_rate(), Some(Fraction::new(3, 2)?));
    let relations: Vec<_> = book.rates().iter().map(|r| r.relation).collect();
    assert_eq!(
        relations,
        vec![
            Relation::Greater,
            Relation::Equal,
            Relation::Lesser,
            Relation::Lesser
        ]
    );
    assert_eq!(book.median_rate().and_then(|r| r.to_fixed()), Some(FIXED1 * 3 / 2));

    // Oracle 3 revises downwards and the median drops to 1.45.
    submit(&mut book, oracle(3), Fraction::new(1, 1)?, 1_010)?;
    assert_eq!(book.median_rate(), Some(Fraction::new(29, 20)?));
    assert_eq!(book.timestamps()[0].oracle, oracle(3));
    Ok(())
}

#[test]
fn expiry_never_empties_the_book() -> Result<()> {
    common::init_tracing();
    let mut book = book_with_oracles(RegistryOptions::default(), 100, 4)?;
    for n in 1..=4 {
        submit(&mut book, oracle(n), Fraction::from_integer(n), n * 10)?;
    }
    assert_eq!(book.remove_expired_reports(1_000, 2)?, vec![oracle(1), oracle(2)]);
    assert_eq!(
        book.remove_expired_reports(1_000, 2),
        Err(RegistryError::InsufficientElements {
            requested: 2,
            available: 2
        })
    );
    assert_eq!(book.remove_expired_reports(1_000, 1)?, vec![oracle(3)]);
    assert_eq!(book.num_rates(), 1);
    assert_eq!(book.is_oldest_report_expired(1_000), (true, oracle(4)));
    assert!(book.remove_expired_reports(1_000, 1).is_err());

    book.remove_report(oracle(4))?;
    assert_eq!(book.median_rate(), None);
    assert_eq!(book.remove_report(oracle(4)), Err(RegistryError::NotFound));
    Ok(())
}

#[test]
fn fresh_reports_survive_expiry_sweeps() -> Result<()> {
    let mut book = book_with_oracles(RegistryOptions::default(), 100, 3)?;
    submit(&mut book, oracle(1), Fraction::from_integer(1), 0)?;
    submit(&mut book, oracle(2), Fraction::from_integer(2), 150)?;
    submit(&mut book, oracle(3), Fraction::from_integer(3), 160)?;
    assert_eq!(book.remove_expired_reports(200, 2)?, vec![oracle(1)]);
    assert_eq!(book.num_rates(), 2);

    // Shortening the expiry makes the remaining older report stale too.
    book.set_report_expiry(45);
    assert_eq!(book.remove_expired_reports(200, 1)?, vec![oracle(2)]);
    assert_eq!(book.median_rate(), Some(Fraction::from_integer(3)));
    Ok(())
}

#[test]
fn capacity_bounds_the_number_of_oracles() -> Result<()> {
    let mut book = book_with_oracles(RegistryOptions::new().capacity(2), 300, 2)?;
    assert_eq!(
        book.add_oracle(oracle(3)),
        Err(RegistryError::CapacityExceeded { capacity: 2 })
    );
    submit(&mut book, oracle(1), Fraction::from_integer(1), 1)?;
    submit(&mut book, oracle(2), Fraction::from_integer(2), 2)?;
    // Existing oracles can still update.
    submit(&mut book, oracle(1), Fraction::from_integer(5), 4)?;
    assert_eq!(book.rates()[0].oracle, oracle(1));
    Ok(())
}

#[test]
fn revoked_oracles_lose_their_report() -> Result<()> {
    common::init_tracing();
    let mut book = book_with_oracles(RegistryOptions::default(), 300, 3)?;
    submit(&mut book, oracle(1), Fraction::from_integer(1), 1)?;
    submit(&mut book, oracle(2), Fraction::from_integer(2), 2)?;
    submit(&mut book, oracle(3), Fraction::from_integer(3), 3)?;
    assert_eq!(book.median_rate(), Some(Fraction::from_integer(2)));

    book.remove_oracle(oracle(2))?;
    assert!(!book.is_oracle(&oracle(2)));
    assert_eq!(book.oracles(), &[oracle(1), oracle(3)]);
    assert_eq!(book.median_rate(), Some(Fraction::from_integer(3)));
    assert_eq!(
        submit(&mut book, oracle(2), Fraction::from_integer(2), 4),
        Err(RegistryError::Unauthorized { oracle: oracle(2) })
    );

    book.add_oracle(oracle(2))?;
    submit(&mut book, oracle(2), Fraction::from_integer(2), 5)?;
    assert_eq!(book.timestamps()[0].oracle, oracle(2));
    Ok(())
}

#[test]
fn null_oracle_is_refused() {
    let mut book = ReportBook::new(RegistryOptions::default(), 300);
    assert_eq!(book.add_oracle(Address::NULL), Err(RegistryError::InvalidKey));
    assert_eq!(
        book.report(Address::NULL, Fraction::from_integer(1), 0, Default::default()),
        Err(RegistryError::InvalidKey)
    );
}
