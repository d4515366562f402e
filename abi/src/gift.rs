//! Prize catalogue entries from `GET /games/gifts/`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gift {
    pub id: u32,
    /// Prize tier letter ("A" is the rarest).
    pub range: String,
    pub name: String,
    pub stock_quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl Gift {
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Catalogue shown when the gift endpoint is unreachable.
    pub fn fallback_catalog() -> Vec<Gift> {
        const STATIC: [(u32, &str, &str, u32, &str); 5] = [
            (1, "A", "Montre connecter", 98, "/static/images/montre-image.jpg"),
            (2, "B", "Echarpe", 1605, "/static/images/maillot-image.jpeg"),
            (3, "B", "Casquette", 0, "/static/images/casquette-image.jpg"),
            (4, "C", "Stylo", 0, "/static/images/pencil-image.png"),
            (5, "C", "Porte Cle", 0, "/static/images/portecle-image.png"),
        ];
        STATIC
            .iter()
            .map(|&(id, range, name, stock_quantity, image)| Gift {
                id,
                range: range.to_string(),
                name: name.to_string(),
                stock_quantity,
                image: Some(image.to_string()),
            })
            .collect()
    }
}
