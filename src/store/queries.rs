/// Register a user; yields no row when the username is taken
pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, email)
    VALUES ($1, $2)
    ON CONFLICT (username) DO NOTHING
    RETURNING id, username, email, created_at
"#;

pub const GET_USER: &str = "SELECT id, username, email, created_at FROM users WHERE id = $1";

/// Create a listing with current_price initialized to the starting bid
pub const INSERT_LISTING: &str = r#"
    INSERT INTO listings (title, description, start_bid, current_price, image_url, category, owner_id)
    VALUES ($1, $2, $3, $3, $4, $5, $6)
    RETURNING id, title, description, start_bid, current_price, image_url, category, owner_id, created_at
"#;

pub const GET_LISTING: &str = "SELECT id, title, description, start_bid, current_price, image_url, category, owner_id, created_at FROM listings WHERE id = $1";

pub const GET_LISTINGS: &str = r#"
    SELECT id, title, description, start_bid, current_price, image_url, category, owner_id, created_at
    FROM listings
    WHERE ($1::TEXT IS NULL OR category = $1)
    ORDER BY created_at DESC, id DESC
"#;

pub const GET_CATEGORIES: &str = "SELECT DISTINCT category FROM listings ORDER BY category";

/// Bid history, highest first
pub const GET_BIDS: &str = r#"
    SELECT id, listing_id, user_id, amount, created_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY amount DESC, id DESC
"#;

pub const GET_HIGHEST_BID: &str = r#"
    SELECT id, listing_id, user_id, amount, created_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY amount DESC, id DESC
    LIMIT 1
"#;

pub const HAS_BID: &str =
    "SELECT EXISTS(SELECT 1 FROM bids WHERE listing_id = $1 AND user_id = $2 AND amount = $3)";

/// Lock the listing row and read its current price
pub const LOCK_LISTING_PRICE: &str =
    "SELECT current_price FROM listings WHERE id = $1 FOR UPDATE";

pub const LOCK_LISTING: &str = "SELECT id FROM listings WHERE id = $1 FOR UPDATE";

pub const IS_CLOSED: &str = "SELECT EXISTS(SELECT 1 FROM closed_listings WHERE listing_id = $1)";

pub const INSERT_BID: &str = r#"
    INSERT INTO bids (listing_id, user_id, amount)
    VALUES ($1, $2, $3)
    RETURNING id, listing_id, user_id, amount, created_at
"#;

pub const UPDATE_CURRENT_PRICE: &str =
    "UPDATE listings SET current_price = $1 WHERE id = $2 AND current_price < $1";

/// Close an auction; yields no row when already closed
pub const INSERT_CLOSED: &str = r#"
    INSERT INTO closed_listings (listing_id, closed_by)
    VALUES ($1, $2)
    ON CONFLICT (listing_id) DO NOTHING
    RETURNING listing_id, closed_by, closed_at
"#;

pub const GET_CLOSED: &str =
    "SELECT listing_id, closed_by, closed_at FROM closed_listings WHERE listing_id = $1";

pub const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (listing_id, user_id, text)
    VALUES ($1, $2, $3)
    RETURNING id, listing_id, user_id, text, created_at
"#;

pub const GET_COMMENTS: &str = r#"
    SELECT id, listing_id, user_id, text, created_at
    FROM comments
    WHERE listing_id = $1
    ORDER BY created_at, id
"#;

/// Watchlist
pub const INSERT_WATCH: &str = r#"
    INSERT INTO watchlist (user_id, listing_id)
    VALUES ($1, $2)
    ON CONFLICT (user_id, listing_id) DO NOTHING
    RETURNING id, user_id, listing_id, created_at
"#;

pub const DELETE_WATCH: &str = "DELETE FROM watchlist WHERE user_id = $1 AND listing_id = $2";

pub const IS_WATCHING: &str =
    "SELECT EXISTS(SELECT 1 FROM watchlist WHERE user_id = $1 AND listing_id = $2)";

pub const GET_WATCHED_LISTINGS: &str = r#"
    SELECT l.id, l.title, l.description, l.start_bid, l.current_price, l.image_url, l.category, l.owner_id, l.created_at
    FROM listings l
    JOIN watchlist w ON w.listing_id = l.id
    WHERE w.user_id = $1
    ORDER BY w.created_at DESC, w.id DESC
"#;
