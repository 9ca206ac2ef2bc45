use serde_json::{json, Value};

/// One entry of a generated feed, shaped like the iTunes RSS JSON.
#[derive(Clone, Debug)]
pub struct FeedEntry {
    id: String,
    name: String,
    artist: String,
    release_date: String,
    genres: Vec<String>,
    track_count: u32,
    price: f64,
}

#[allow(dead_code)]
impl FeedEntry {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Album {}", id),
            artist: format!("Artist {}", id),
            release_date: "2021-06-01T00:00:00-07:00".to_string(),
            genres: Vec::new(),
            track_count: 10,
            price: 9.99,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn artist(mut self, artist: &str) -> Self {
        self.artist = artist.to_string();
        self
    }

    /// Release date as `YYYY-MM-DD`.
    pub fn released(mut self, date: &str) -> Self {
        self.release_date = format!("{}T00:00:00-07:00", date);
        self
    }

    pub fn genres(mut self, genres: &[&str]) -> Self {
        self.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn track_count(mut self, track_count: u32) -> Self {
        self.track_count = track_count;
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    fn to_json(&self) -> Value {
        let categories: Vec<Value> = self
            .genres
            .iter()
            .map(|genre| {
                json!({
                    "attributes": {
                        "im:id": "14",
                        "term": genre,
                        "scheme": "https://music.apple.com/us/genre/music",
                        "label": genre
                    }
                })
            })
            .collect();

        json!({
            "im:name": { "label": self.name },
            "im:image": [
                { "label": format!("https://img.example/{}/55x55.png", self.id), "attributes": { "height": "55" } },
                { "label": format!("https://img.example/{}/60x60.png", self.id), "attributes": { "height": "60" } },
                { "label": format!("https://img.example/{}/170x170.png", self.id), "attributes": { "height": "170" } }
            ],
            "im:itemCount": { "label": self.track_count.to_string() },
            "im:price": {
                "label": format!("${:.2}", self.price),
                "attributes": { "amount": format!("{:.5}", self.price), "currency": "USD" }
            },
            "im:contentType": {
                "im:contentType": { "attributes": { "term": "Album", "label": "Album" } },
                "attributes": { "term": "Music", "label": "Music" }
            },
            "rights": { "label": format!("℗ 2021 {}", self.artist) },
            "title": { "label": format!("{} - {}", self.name, self.artist) },
            "link": {
                "attributes": {
                    "rel": "alternate",
                    "type": "text/html",
                    "href": format!("https://music.apple.com/us/album/{}?uo=2", self.id)
                }
            },
            "id": {
                "label": format!("https://music.apple.com/us/album/{}?uo=2", self.id),
                "attributes": { "im:id": self.id }
            },
            "im:artist": {
                "label": self.artist,
                "attributes": { "href": "https://music.apple.com/us/artist/1?uo=2" }
            },
            "category": categories,
            "im:releaseDate": {
                "label": self.release_date,
                "attributes": { "label": "June 1, 2021" }
            }
        })
    }
}

/// A complete feed document; entry order defines rank.
#[derive(Clone, Debug, Default)]
pub struct FeedBuilder {
    entries: Vec<FeedEntry>,
}

#[allow(dead_code)]
impl FeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries with default fields for each id, in order.
    pub fn with_ids(ids: &[&str]) -> Self {
        ids.iter()
            .fold(Self::new(), |feed, id| feed.entry(FeedEntry::new(id)))
    }

    pub fn entry(mut self, entry: FeedEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let entries: Vec<Value> = self.entries.iter().map(FeedEntry::to_json).collect();
        let document = json!({
            "feed": {
                "author": {
                    "name": { "label": "iTunes Store" },
                    "uri": { "label": "http://www.apple.com/itunes/" }
                },
                "entry": entries,
                "updated": { "label": "2021-06-07T10:00:00-07:00" },
                "title": { "label": "iTunes Store: Top Albums" }
            }
        });
        serde_json::to_vec(&document).unwrap()
    }
}
