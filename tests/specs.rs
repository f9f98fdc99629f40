use chrono::Utc;
use emporium::{
    models::{Notebook, Product, ProductKind, Smartphone, product_url},
    specs::{SD_MAX_CAPACITY_LABEL, SpecRow, product_spec, render_spec_table},
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn smartphone(sd: bool, sd_max_volume: Option<&str>) -> Smartphone {
    Smartphone {
        id: Uuid::new_v4(),
        title: "Pixel".into(),
        slug: "pixel".into(),
        image_name: None,
        description: None,
        price: Decimal::new(49_900, 2),
        category_id: Uuid::new_v4(),
        diagonal: "6.1".into(),
        display_type: "OLED".into(),
        resolution: "1080x2400".into(),
        battery_capacity: "4000 mAh".into(),
        ram: "8 GB".into(),
        sd,
        sd_max_volume: sd_max_volume.map(str::to_string),
        camera_main: "50 MP".into(),
        camera_frontal: "12 MP".into(),
        url: product_url(ProductKind::Smartphone, "pixel"),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn notebook() -> Notebook {
    Notebook {
        id: Uuid::new_v4(),
        title: "ThinkPad <X1>".into(),
        slug: "thinkpad-x1".into(),
        image_name: None,
        description: None,
        price: Decimal::new(150_000, 2),
        category_id: Uuid::new_v4(),
        diagonal: "14\"".into(),
        display_type: "IPS".into(),
        processor_freq: "3.2 GHz".into(),
        ram: "16 GB".into(),
        video_card: "Intel Iris Xe".into(),
        battery_capacity: "57 Wh".into(),
        url: product_url(ProductKind::Notebook, "thinkpad-x1"),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn names(rows: &[SpecRow]) -> Vec<&str> {
    rows.iter().map(|row| row.name.as_str()).collect()
}

#[test]
fn notebook_rows_follow_field_order() {
    let rows = product_spec(&Product::Notebook(notebook()));
    assert_eq!(
        names(&rows),
        [
            "Diagonal",
            "Display type",
            "Processor frequency",
            "RAM",
            "Video card",
            "Battery capacity"
        ]
    );
    assert_eq!(rows[4].value, "Intel Iris Xe");
}

#[test]
fn smartphone_without_sd_has_no_capacity_row() {
    let rows = product_spec(&Product::Smartphone(smartphone(false, Some("256 GB"))));
    assert!(!names(&rows).contains(&SD_MAX_CAPACITY_LABEL));
    let sd = rows.iter().find(|row| row.name == "SD").expect("sd row");
    assert_eq!(sd.value, "No");
}

#[test]
fn smartphone_with_sd_lists_capacity() {
    let rows = product_spec(&Product::Smartphone(smartphone(true, Some("256 GB"))));
    let capacity = rows
        .iter()
        .find(|row| row.name == SD_MAX_CAPACITY_LABEL)
        .expect("capacity row");
    assert_eq!(capacity.value, "256 GB");
    assert_eq!(rows.len(), 9);
}

#[test]
fn rendered_table_escapes_values() {
    let rows = product_spec(&Product::Notebook(notebook()));
    let html = render_spec_table(&rows);
    assert!(html.starts_with("<table class=\"table\"><tbody>"));
    assert!(html.ends_with("</tbody></table>"));
    assert!(html.contains("<tr><td>Diagonal</td><td>14&quot;</td></tr>"));
    assert_eq!(html.matches("<tr>").count(), rows.len());
}
