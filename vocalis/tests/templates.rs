use lazy_static::lazy_static;
use serde::Serialize;
use std::thread;
use vocalis::{
    LanguageTag, Reply, Request, Template, TemplateContext, TemplateError, TemplateOption,
    helpers, wire::TEMPLATE_APOLOGY,
};

lazy_static! {
    static ref ORDER: Template = Template::builder(
        "{{ value.customer }}, your order of {{ join value.items \", \" \" and \" }} is {{ status value.ready }}."
    )
    .name("order")
    .helper("join", helpers::join)
    .helper("status", |args: &[serde_json::Value]| {
        Ok(serde_json::Value::from(if args.first().and_then(|v| v.as_bool()) == Some(true) {
            "ready"
        } else {
            "on its way"
        }))
    })
    .translation("fr", "{{ value.customer }}, votre commande est {{ status value.ready }}.")
    .build()
    .unwrap();
}

#[derive(Serialize)]
struct Order<'a> {
    customer: &'a str,
    items: Vec<&'a str>,
    ready: bool,
}

fn render(locale: &str, order: &Order<'_>) -> String {
    let tag = LanguageTag::parse(locale).unwrap();
    ORDER.render(&TemplateContext::new(tag, order).unwrap()).unwrap()
}

#[test]
fn test_struct_values_and_helpers() {
    let order = Order {
        customer: "Ana",
        items: vec!["tacos", "horchata"],
        ready: true,
    };
    assert_eq!(
        render("en-US", &order),
        "Ana, your order of tacos and horchata is ready."
    );
    assert_eq!(render("fr-CA", &order), "Ana, votre commande est ready.");
    assert_eq!(
        render("pt-BR", &order),
        "Ana, your order of tacos and horchata is ready."
    );
}

#[test]
fn test_every_locale_renders() {
    let order = Order {
        customer: "Bo",
        items: vec![],
        ready: false,
    };
    for locale in ["", "und", "en", "en-GB", "fr", "fr-FR", "de", "zh-Hant-TW", "es-419"] {
        assert!(!render(locale, &order).is_empty(), "{locale}");
    }
}

#[test]
fn test_escaping_for_ssml() {
    let t = Template::builder("{{ value }} | {{{ value }}}").build().unwrap();
    let ctx = TemplateContext::new(LanguageTag::american_english(), "Ben & Jerry's <3").unwrap();
    assert_eq!(
        t.render(&ctx).unwrap(),
        "Ben &amp; Jerry&apos;s &lt;3 | Ben & Jerry's <3"
    );
}

#[test]
fn test_option_list_order_does_not_matter() {
    let options = vec![
        TemplateOption::translation("es", "{{ shout value }}"),
        TemplateOption::helper("shout", helpers::upper),
    ];
    let t = Template::from_options("{{ lower value }}", options.clone());
    assert!(matches!(t, Err(TemplateError::Compile { .. })));

    let t = Template::from_options(
        "{{ shout value }}",
        options.into_iter().chain([TemplateOption::helper("lower", helpers::lower)]),
    )
    .unwrap();
    let ctx = TemplateContext::new(LanguageTag::parse("es-AR").unwrap(), "hola").unwrap();
    assert_eq!(t.render(&ctx).unwrap(), "HOLA");
}

#[test]
fn test_render_errors_become_apology_in_replies() {
    let t = Template::builder("{{ value.name }}").build().unwrap();
    let reply = Reply::new(&Request::launch()).speak_template(&t, &42);
    assert_eq!(
        reply.speech(),
        Some(format!("<speak>{TEMPLATE_APOLOGY}</speak>").as_str())
    );
}

#[test]
fn test_templates_are_shared_across_threads() {
    let handles: Vec<_> = ["en-US", "fr-FR", "es-MX", "ja-JP"]
        .into_iter()
        .map(|locale| {
            thread::spawn(move || {
                let order = Order {
                    customer: "Cy",
                    items: vec!["tea"],
                    ready: false,
                };
                render(locale, &order)
            })
        })
        .collect();

    let rendered: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(rendered[0], "Cy, your order of tea is on its way.");
    assert_eq!(rendered[1], "Cy, votre commande est on its way.");
    assert_eq!(rendered[2], rendered[0]);
    assert_eq!(rendered[3], rendered[0]);
}
