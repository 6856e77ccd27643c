use socioprice::{format_number, format_percent, format_price};

#[test]
fn numbers_are_grouped_by_thousands() {
    assert_eq!(format_number(0.0), "0");
    assert_eq!(format_number(999.0), "999");
    assert_eq!(format_number(1_000.0), "1,000");
    assert_eq!(format_number(123_456.0), "123,456");
    assert_eq!(format_number(1_234_567.4), "1,234,567");
}

#[test]
fn prices_are_rounded_whole_dollars() {
    assert_eq!(format_price(26.6), "$27");
    assert_eq!(format_price(1_499.5), "$1,500");
    assert_eq!(format_percent(0.05), "5.0%");
}
