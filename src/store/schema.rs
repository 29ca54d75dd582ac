use rusqlite::{Connection, Error};

/// Table definitions. Choice fields are pinned with CHECK constraints so the
/// database rejects values the application enums do not know.
const TABLES: [&str; 19] = [
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        username TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS manufacturers (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        telephone TEXT,
        memo TEXT
    )",
    "CREATE TABLE IF NOT EXISTS business_units (
        id INTEGER PRIMARY KEY,
        parent_unit_id INTEGER REFERENCES business_units(id) ON DELETE SET NULL,
        name TEXT NOT NULL UNIQUE,
        memo TEXT
    )",
    "CREATE TABLE IF NOT EXISTS idcs (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        memo TEXT
    )",
    "CREATE TABLE IF NOT EXISTS contracts (
        id INTEGER PRIMARY KEY,
        sn TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        memo TEXT,
        price INTEGER NOT NULL,
        detail TEXT,
        start_day TEXT,
        end_day TEXT,
        license_num INTEGER,
        c_day TEXT NOT NULL,
        m_day TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        c_day TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS assets (
        id INTEGER PRIMARY KEY,
        asset_type TEXT NOT NULL DEFAULT 'server'
            CHECK (asset_type IN ('server', 'networkdevice', 'storagedevice', 'securitydevice', 'software')),
        name TEXT NOT NULL UNIQUE,
        sn TEXT NOT NULL UNIQUE,
        business_unit_id INTEGER REFERENCES business_units(id) ON DELETE SET NULL,
        status INTEGER NOT NULL DEFAULT 0 CHECK (status BETWEEN 0 AND 4),
        manufacturer_id INTEGER REFERENCES manufacturers(id) ON DELETE SET NULL,
        manage_ip TEXT,
        admin_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        idc_id INTEGER REFERENCES idcs(id) ON DELETE SET NULL,
        contract_id INTEGER REFERENCES contracts(id) ON DELETE SET NULL,
        purchase_day TEXT,
        expire_day TEXT,
        price REAL,
        approved_by_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        memo TEXT,
        c_time TEXT NOT NULL,
        m_time TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS asset_tags (
        asset_id INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (asset_id, tag_id)
    )",
    "CREATE TABLE IF NOT EXISTS servers (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL UNIQUE REFERENCES assets(id) ON DELETE CASCADE,
        sub_asset_type INTEGER NOT NULL DEFAULT 0 CHECK (sub_asset_type IN (0, 1, 2)),
        created_by TEXT NOT NULL DEFAULT 'auto' CHECK (created_by IN ('auto', 'manual')),
        hosted_on_id INTEGER REFERENCES servers(id) ON DELETE SET NULL,
        model TEXT,
        raid_type TEXT,
        os_type TEXT,
        os_distribution TEXT,
        os_release TEXT
    )",
    "CREATE TABLE IF NOT EXISTS network_devices (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL UNIQUE REFERENCES assets(id) ON DELETE CASCADE,
        sub_asset_type INTEGER NOT NULL DEFAULT 0 CHECK (sub_asset_type IN (0, 1, 2, 4)),
        vlan_ip TEXT,
        intranet_ip TEXT,
        model TEXT,
        firmware TEXT,
        port_num INTEGER,
        device_detail TEXT
    )",
    "CREATE TABLE IF NOT EXISTS storage_devices (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL UNIQUE REFERENCES assets(id) ON DELETE CASCADE,
        sub_asset_type INTEGER NOT NULL DEFAULT 0 CHECK (sub_asset_type IN (0, 1, 2, 4))
    )",
    "CREATE TABLE IF NOT EXISTS security_devices (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL UNIQUE REFERENCES assets(id) ON DELETE CASCADE,
        sub_asset_type INTEGER NOT NULL DEFAULT 0 CHECK (sub_asset_type IN (0, 1, 2, 4))
    )",
    "CREATE TABLE IF NOT EXISTS software (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL UNIQUE REFERENCES assets(id) ON DELETE CASCADE,
        sub_asset_type INTEGER NOT NULL DEFAULT 0 CHECK (sub_asset_type IN (0, 1, 2)),
        license_num INTEGER NOT NULL DEFAULT 1,
        version TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS cpus (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL UNIQUE REFERENCES assets(id) ON DELETE CASCADE,
        cpu_model TEXT,
        cpu_count INTEGER NOT NULL DEFAULT 1 CHECK (cpu_count >= 0),
        cpu_core_count INTEGER NOT NULL DEFAULT 1 CHECK (cpu_core_count >= 0)
    )",
    "CREATE TABLE IF NOT EXISTS rams (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
        sn TEXT,
        model TEXT,
        manufacturer TEXT,
        slot TEXT NOT NULL,
        capacity INTEGER,
        UNIQUE (asset_id, slot)
    )",
    "CREATE TABLE IF NOT EXISTS disks (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
        sn TEXT NOT NULL,
        slot TEXT,
        model TEXT,
        manufacturer TEXT,
        capacity REAL,
        interface_type TEXT NOT NULL DEFAULT 'unknown'
            CHECK (interface_type IN ('SATA', 'SAS', 'SCSI', 'SSD', 'unknown')),
        UNIQUE (asset_id, sn)
    )",
    "CREATE TABLE IF NOT EXISTS nics (
        id INTEGER PRIMARY KEY,
        asset_id INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
        name TEXT,
        model TEXT NOT NULL,
        mac TEXT NOT NULL,
        ip_address TEXT,
        net_mask TEXT,
        bonding TEXT,
        UNIQUE (asset_id, model, mac)
    )",
    "CREATE TABLE IF NOT EXISTS new_asset_approval_zone (
        id INTEGER PRIMARY KEY,
        sn TEXT NOT NULL UNIQUE,
        asset_type TEXT DEFAULT 'server'
            CHECK (asset_type IS NULL OR asset_type IN ('server', 'networkdevice', 'storagedevice', 'securitydevice', 'IDC', 'software')),
        manufacturer TEXT,
        model TEXT,
        ram_size INTEGER CHECK (ram_size IS NULL OR ram_size >= 0),
        cpu_model TEXT,
        cpu_count INTEGER CHECK (cpu_count IS NULL OR cpu_count >= 0),
        cpu_core_count INTEGER CHECK (cpu_core_count IS NULL OR cpu_core_count >= 0),
        os_distribution TEXT,
        os_type TEXT,
        os_release TEXT,
        data TEXT NOT NULL,
        c_time TEXT NOT NULL,
        m_time TEXT NOT NULL,
        approved INTEGER NOT NULL DEFAULT 0 CHECK (approved IN (0, 1))
    )",
    "CREATE TABLE IF NOT EXISTS event_logs (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        event_type INTEGER NOT NULL DEFAULT 4 CHECK (event_type BETWEEN 0 AND 6),
        asset_id INTEGER REFERENCES assets(id) ON DELETE SET NULL,
        new_asset_id INTEGER REFERENCES new_asset_approval_zone(id) ON DELETE SET NULL,
        component TEXT,
        detail TEXT NOT NULL,
        date TEXT NOT NULL,
        user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        memo TEXT
    )",
];

/// Enable foreign keys and create every table that does not exist yet.
pub fn setup_tables(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;
    for table in TABLES {
        connection.execute(table, ())?;
    }
    Ok(())
}
