mod common;

use common::{service, vocab, Unit};
use samyama_ogm::sparql::{Expression, SparqlConnection, Variable};
use samyama_ogm::{OgmError, OrderBy, SearchQuery, SelectQuery, SparqlResource};

#[test]
fn test_unit_scenario() {
    let service = service();
    let builder = service.index().builder_of::<Unit>().unwrap();

    let mut unit = Unit::new("kg");
    unit.set_uri(vocab("kilogram"));
    let create = builder.build_create(None, &unit.to_values()).unwrap();
    // type + symbol, nothing for the null alternative symbol
    assert_eq!(create.inserted_quads().count(), 2);
    service.connection().execute_update(&create).unwrap();

    let select = builder.build_select(None, None);
    let text = select.to_string();
    assert!(text.contains("OPTIONAL"));
    assert!(text.contains("?alternativeSymbol"));

    let rows = service.connection().execute_select(&select).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_bound("symbol"));
    assert!(!rows[0].is_bound("alternativeSymbol"));

    let loaded: Unit = service.get_by_uri(&vocab("kilogram"), None).unwrap().unwrap();
    assert_eq!(loaded, unit);
}

#[test]
fn test_create_generates_uri_and_round_trips() {
    let service = service();
    let mut unit = Unit::new("m s-1");
    unit.alternative_symbol = Some("m/s".to_string());
    service.create(&mut unit).unwrap();

    let uri = unit.uri.clone().unwrap();
    assert_eq!(uri.as_str(), "http://test.samyama.org/id/unit/m_s-1");
    assert!(service.uri_exists(&uri).unwrap());
    assert!(service.uri_exists_for_type::<Unit>(&uri).unwrap());

    let loaded: Unit = service.get_by_uri(&uri, None).unwrap().unwrap();
    assert_eq!(loaded, unit);
    assert!(service.get_by_uri::<Unit>(&vocab("absent"), None).unwrap().is_none());
}

#[test]
fn test_caller_uri_conflict() {
    let service = service();
    let mut first = Unit::new("g");
    first.set_uri(vocab("gram"));
    service.create(&mut first).unwrap();

    let mut second = Unit::new("gr");
    second.set_uri(vocab("gram"));
    match service.create(&mut second) {
        Err(OgmError::AlreadyExistingUri(uri)) => assert_eq!(uri, vocab("gram")),
        other => panic!("expected a URI conflict, got {:?}", other),
    }
}

#[test]
fn test_select_and_count_agree() {
    let service = service();
    let mut units: Vec<Unit> = ["kg", "km", "K", "s", "mol"].iter().map(|s| Unit::new(s)).collect();
    service.create_all(&mut units).unwrap();

    let starts_with_k = |query: &mut SelectQuery| {
        query.add_filter(Expression::regex_ignore_case(&Variable::new("symbol"), "^k"));
    };
    let query = SearchQuery::new().filter(&starts_with_k);
    let found: Vec<Unit> = service.search(&query).unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(service.count::<Unit>(&query).unwrap(), found.len());

    let all = SearchQuery::new();
    assert_eq!(service.search::<Unit>(&all).unwrap().len(), 5);
    assert_eq!(service.count::<Unit>(&all).unwrap(), 5);
}

#[test]
fn test_pagination() {
    let service = service();
    let mut units: Vec<Unit> = ["a", "b", "c", "d", "e"].iter().map(|s| Unit::new(s)).collect();
    service.create_all(&mut units).unwrap();

    let query = SearchQuery::new().order_by(OrderBy::asc("symbol")).page(1, 2);
    let page = service.search_with_pagination::<Unit>(&query).unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.page_count(), 3);
    let symbols: Vec<_> = page.items.iter().map(|u| u.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["c", "d"]);

    let query = SearchQuery::new().order_by(OrderBy::desc("symbol")).page(0, 2);
    let page = service.search_with_pagination::<Unit>(&query).unwrap();
    let symbols: Vec<_> = page.items.iter().map(|u| u.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["e", "d"]);

    let beyond = SearchQuery::new().page(3, 2);
    let page = service.search_with_pagination::<Unit>(&beyond).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 5);
}

#[test]
fn test_order_on_unknown_field() {
    let service = service();
    let query = SearchQuery::new().order_by(OrderBy::asc("weight"));
    assert!(matches!(
        service.search::<Unit>(&query),
        Err(OgmError::UnknownField { .. })
    ));
}

#[test]
fn test_update_replaces_stored_values() {
    let service = service();
    let mut unit = Unit::new("l");
    unit.alternative_symbol = Some("L".to_string());
    service.create(&mut unit).unwrap();

    unit.symbol = "dm3".to_string();
    unit.alternative_symbol = None;
    service.update(&unit).unwrap();

    let loaded: Unit = service.get_by_uri(unit.uri.as_ref().unwrap(), None).unwrap().unwrap();
    assert_eq!(loaded.symbol, "dm3");
    assert_eq!(loaded.alternative_symbol, None);
    assert_eq!(service.count::<Unit>(&SearchQuery::new()).unwrap(), 1);

    let mut unsaved = Unit::new("x");
    unsaved.set_uri(vocab("never-created"));
    assert!(matches!(service.update(&unsaved), Err(OgmError::NotFound(_))));
    assert!(matches!(
        service.update(&Unit::new("y")),
        Err(OgmError::MissingRequiredField { .. })
    ));
}

#[test]
fn test_delete_all() {
    let service = service();
    let mut units = vec![Unit::new("A"), Unit::new("V"), Unit::new("W")];
    service.create_all(&mut units).unwrap();

    let uris: Vec<_> = units[..2].iter().map(|u| u.uri.clone().unwrap()).collect();
    service.delete_all::<Unit>(&uris).unwrap();

    let remaining: Vec<Unit> = service.search(&SearchQuery::new()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].symbol, "W");
    assert!(!service.uri_exists(&uris[0]).unwrap());
}

#[test]
fn test_get_by_uris_skips_absent() {
    let service = service();
    let mut units = vec![Unit::new("cd"), Unit::new("lm")];
    service.create_all(&mut units).unwrap();

    let mut uris: Vec<_> = units.iter().map(|u| u.uri.clone().unwrap()).collect();
    uris.push(vocab("absent"));
    let loaded: Vec<Unit> = service.get_by_uris(&uris, None).unwrap();
    assert_eq!(loaded.len(), 2);
}

#[test]
fn test_unique_property_value() {
    let service = service();
    let mut units = vec![Unit::new("Pa"), Unit::new("N m-2")];
    units[0].alternative_symbol = Some("pressure".to_string());
    units[1].alternative_symbol = Some("pressure".to_string());
    service.create_all(&mut units).unwrap();

    let found: Option<Unit> = service
        .get_by_unique_property_value(&vocab("symbol"), "Pa", None)
        .unwrap();
    assert_eq!(found.unwrap().uri, units[0].uri);
    assert!(service
        .get_by_unique_property_value::<Unit>(&vocab("symbol"), "bar", None)
        .unwrap()
        .is_none());

    assert!(matches!(
        service.get_by_unique_property_value::<Unit>(&vocab("alternativeSymbol"), "pressure", None),
        Err(OgmError::MultipleResults(_))
    ));
    assert!(service
        .exists_by_unique_property_value::<Unit>(&vocab("alternativeSymbol"), "pressure")
        .unwrap());
    assert!(matches!(
        service.exists_by_unique_property_value::<Unit>(&vocab("unknown"), "x"),
        Err(OgmError::UnknownField { .. })
    ));
}

#[test]
fn test_describe_lists_outgoing_triples() {
    let service = service();
    let mut unit = Unit::new("cm");
    unit.alternative_symbol = Some("centimetre".to_string());
    service.create(&mut unit).unwrap();

    let triples = service.describe(unit.uri.as_ref().unwrap()).unwrap();
    assert_eq!(triples.len(), 3);
}
