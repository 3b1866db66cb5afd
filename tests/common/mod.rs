#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::json;

/// One aligned manifest position.
#[derive(Clone, Debug)]
pub struct Row {
    pub image_id: i64,
    pub category_id: i64,
    pub file_name: String,
    pub class: String,
    pub supercategory: String,
}

impl Row {
    pub fn new(id: i64, file_name: &str, class: &str, supercategory: &str) -> Self {
        Self {
            image_id: id,
            category_id: id,
            file_name: file_name.to_string(),
            class: class.to_string(),
            supercategory: supercategory.to_string(),
        }
    }
}

pub fn manifest_json(rows: &[Row]) -> String {
    let annotations: Vec<_> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            json!({"id": i as i64 + 1, "image_id": r.image_id, "category_id": r.category_id})
        })
        .collect();
    let images: Vec<_> = rows
        .iter()
        .map(|r| json!({"id": r.image_id, "file_name": r.file_name, "width": 4, "height": 2}))
        .collect();
    let categories: Vec<_> = rows
        .iter()
        .map(|r| json!({"id": r.category_id, "class": r.class, "supercategory": r.supercategory}))
        .collect();

    serde_json::to_string_pretty(&json!({
        "info": {"year": 2018},
        "annotations": annotations,
        "images": images,
        "categories": categories,
    }))
    .expect("serialize manifest")
}

/// The three-record example: two Insecta "A" records around one Fungi "B".
pub fn example_rows() -> Vec<Row> {
    vec![
        Row::new(1, "train_val2018/Insecta/1/a.bmp", "A", "Insecta"),
        Row::new(2, "train_val2018/Fungi/2/b.bmp", "B", "Fungi"),
        Row::new(3, "train_val2018/Insecta/3/c.bmp", "A", "Insecta"),
    ]
}

/// Writes `{split}2018.json` plus a small BMP for every row.
pub fn write_dataset(root: &Path, split: &str, rows: &[Row]) {
    fs::write(root.join(format!("{split}2018.json")), manifest_json(rows)).expect("write manifest");
    for (i, row) in rows.iter().enumerate() {
        write_bmp(&root.join(&row.file_name), i as u32 + 1, 2);
    }
}

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    // BITMAPINFOHEADER, 24 bits per pixel, uncompressed
    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}
