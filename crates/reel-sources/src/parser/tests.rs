use super::*;
use reel_config::SelectorConfig;

fn selectors() -> Selectors {
    Selectors::compile(&SelectorConfig::default()).unwrap()
}

fn rating_block(filled: usize, half: usize, empty: usize) -> String {
    let mut html = String::from(r#"<span class="star-display">"#);
    for _ in 0..filled {
        html.push_str(r#"<span class="star-display__filled"></span>"#);
    }
    for _ in 0..half {
        html.push_str(r#"<span class="star-display__half"></span>"#);
    }
    for _ in 0..empty {
        html.push_str(r#"<span class="star-display__empty"></span>"#);
    }
    html.push_str("</span>");
    html
}

fn review_item(filled: usize, half: usize, date: &str, text: &str) -> String {
    format!(
        r#"<li class="audience-reviews__item">
            <div class="audience-reviews__score">{}</div>
            <span class="audience-reviews__duration">{}</span>
            <p class="audience-reviews__review js-review-text clamp clamp-8 js-clamp">{}</p>
            <p class="audience-reviews__review--mobile js-clamp">{}</p>
        </li>"#,
        rating_block(filled, half, 5usize.saturating_sub(filled + half)),
        date,
        text,
        text
    )
}

fn page(items: &[String]) -> String {
    format!(
        r#"<html><body><ul class="audience-reviews">{}</ul>
        <button class="js-prev-next-paging-next">Next</button></body></html>"#,
        items.join("\n")
    )
}

#[test]
fn test_two_filled_one_half_is_two_and_a_half() {
    let html = page(&[review_item(2, 1, "Mar 3, 2021", "Decent")]);
    let parse = parse_page(&html, &selectors());

    assert_eq!(parse.reviews.len(), 1);
    assert_eq!(parse.reviews[0].stars, 2.5);
    assert_eq!(parse.reviews[0].date, "Mar 3, 2021");
    assert_eq!(parse.reviews[0].text, "Decent");
}

#[test]
fn test_stars_equal_filled_plus_half_over_two() {
    let cases = [(0, 0), (0, 1), (1, 0), (3, 1), (4, 1), (5, 0)];
    let items: Vec<String> = cases
        .iter()
        .map(|&(f, h)| review_item(f, h, "Jan 1, 2020", "x"))
        .collect();
    let document = Html::parse_document(&page(&items));

    let stars = extract_stars(&document, &selectors());

    let expected: Vec<f64> = cases.iter().map(|&(f, h)| f as f64 + h as f64 / 2.0).collect();
    assert_eq!(stars, expected);
    for value in stars {
        assert!((0.0..=5.0).contains(&value));
        assert_eq!((value * 2.0).fract(), 0.0);
    }
}

#[test]
fn test_stars_are_clamped_to_five() {
    let html = format!("<html><body>{}</body></html>", rating_block(6, 1, 0));
    let document = Html::parse_document(&html);
    assert_eq!(extract_stars(&document, &selectors()), vec![5.0]);
}

#[test]
fn test_only_first_of_each_text_pair_is_kept() {
    let html = r#"<html><body>
        <p class="js-clamp">first review</p><p class="js-clamp">placeholder one</p>
        <p class="js-clamp">second review</p><p class="js-clamp">placeholder two</p>
    </body></html>"#;
    let document = Html::parse_document(html);

    let texts = extract_texts(&document, &selectors());
    assert_eq!(texts, vec!["first review", "second review"]);
}

#[test]
fn test_dates_take_first_token_only() {
    let html = r#"<html><body>
        <span class="audience-reviews__duration">Feb 14, 2019</span>
        <span class="audience-reviews__duration"> 5d <em>ago</em></span>
    </body></html>"#;
    let document = Html::parse_document(html);

    let dates = extract_dates(&document, &selectors());
    assert_eq!(dates, vec!["Feb 14, 2019", "5d"]);
}

#[test]
fn test_leading_text_token_truncates_at_inline_markup() {
    assert_eq!(leading_text_token(r#"<p class="a">Loved it<br>would watch again</p>"#), "Loved it");
    assert_eq!(leading_text_token("<p><em>Nested</em> text</p>"), "");
    assert_eq!(leading_text_token("<p>Tom &amp; Jerry</p>"), "Tom &amp; Jerry");
    assert_eq!(leading_text_token("no tags at all"), "");
}

#[test]
fn test_missing_markers_yield_empty_parse() {
    let html = "<html><body><div class=\"something-else\">Redesigned page</div></body></html>";
    let parse = parse_page(html, &selectors());

    assert!(parse.reviews.is_empty());
    assert!(parse.is_aligned());
}

#[test]
fn test_single_text_block_misaligns_following_reviews() {
    // First review lacks its second block, so the pairing shifts and later
    // records pick up the placeholder instead of their body.
    let html = format!(
        "<html><body>{}{}{}</body></html>",
        format!(
            r#"{}<span class="audience-reviews__duration">Jan 1, 2020</span><p class="js-clamp">one</p>"#,
            rating_block(5, 0, 0)
        ),
        format!(
            r#"{}<span class="audience-reviews__duration">Jan 2, 2020</span><p class="js-clamp">two</p><p class="js-clamp">(more)</p>"#,
            rating_block(1, 0, 4)
        ),
        format!(
            r#"{}<span class="audience-reviews__duration">Jan 3, 2020</span><p class="js-clamp">three</p><p class="js-clamp">(more)</p>"#,
            rating_block(3, 0, 2)
        ),
    );
    let parse = parse_page(&html, &selectors());

    assert!(parse.is_aligned());
    assert_eq!(parse.reviews[0].text, "one");
    assert_eq!(parse.reviews[1].text, "(more)");
    assert_eq!(parse.reviews[2].text, "(more)");
    assert_eq!(parse.reviews[2].date, "Jan 3, 2020");
}

#[test]
fn test_length_mismatch_zips_to_shortest() {
    let html = format!(
        r#"<html><body>{}{}<span class="audience-reviews__duration">Jan 1, 2020</span>
        <p class="js-clamp">only</p><p class="js-clamp">only</p></body></html>"#,
        rating_block(4, 0, 1),
        rating_block(2, 0, 3)
    );
    let parse = parse_page(&html, &selectors());

    assert!(!parse.is_aligned());
    assert_eq!(parse.star_count, 2);
    assert_eq!(parse.reviews.len(), 1);
    assert_eq!(parse.reviews[0].stars, 4.0);
}

#[test]
fn test_invalid_selector_is_rejected() {
    let config = SelectorConfig {
        date: "span[".to_string(),
        ..SelectorConfig::default()
    };
    match Selectors::compile(&config) {
        Err(ScrapeError::Selector { selector }) => assert_eq!(selector, "span["),
        other => panic!("expected selector error, got {:?}", other.map(|_| ())),
    }
}
