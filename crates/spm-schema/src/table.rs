//! The Salesforce Profile category table.
//!
//! Version windows follow the Metadata API release in which each category or
//! attribute appeared, was renamed, or was retired.

use spm_types::VersionRange;

use crate::category::{AttrDef, AttrDefault, AttrKind, CategoryDef, CategoryKind, IdentityRule, SuffixWhen};

/// XML namespace of every Metadata API document.
pub const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

const fn composite(
    name: &'static str,
    attributes: &'static [AttrDef],
    identity: IdentityRule,
    versions: VersionRange,
) -> CategoryDef {
    CategoryDef {
        name,
        kind: CategoryKind::Composite,
        attributes,
        identity,
        versions,
    }
}

const fn scalar(name: &'static str, attributes: &'static [AttrDef], versions: VersionRange) -> CategoryDef {
    CategoryDef {
        name,
        kind: CategoryKind::Scalar,
        attributes,
        identity: IdentityRule::Category,
        versions,
    }
}

const fn keyed_by(parts: &'static [&'static str]) -> IdentityRule {
    IdentityRule::Parts(parts)
}

const fn enabled_suffix(part: &'static [&'static str]) -> IdentityRule {
    IdentityRule::PartsWithSuffix {
        parts: part,
        suffix: "enabled",
        when: SuffixWhen::True,
    }
}

const ACTION_OVERRIDES: &[AttrDef] = &[
    AttrDef::text("actionName"),
    AttrDef::text("content"),
    AttrDef::text("formFactor"),
    AttrDef::text("pageOrSobjectType"),
    AttrDef::text("recordType"),
    AttrDef::text("type"),
];

const APPLICATION_VISIBILITIES: &[AttrDef] = &[
    AttrDef::text("application"),
    AttrDef::flag("default", false),
    AttrDef::flag("visible", false),
];

const CATEGORY_GROUP_VISIBILITIES: &[AttrDef] = &[
    AttrDef::text("dataCategoryGroup"),
    AttrDef::flag("visibility", false)
        .with_kind(AttrKind::BoolOr("ALL"))
        .with_default(AttrDefault::Text("ALL")),
];

const CLASS_ACCESSES: &[AttrDef] = &[AttrDef::text("apexClass"), AttrDef::flag("enabled", false)];

const CUSTOM_PERMISSIONS: &[AttrDef] = &[AttrDef::flag("enabled", false), AttrDef::text("name")];

// Enabled is part of the identity here, so it stays out of the toggle view.
const NAMED_ACCESSES: &[AttrDef] = &[AttrDef::boolean("enabled", false), AttrDef::text("name")];

const EXTERNAL_DATA_SOURCE_ACCESSES: &[AttrDef] = &[
    AttrDef::flag("enabled", false),
    AttrDef::text("externalDataSource"),
];

const FIELD_LEVEL_SECURITIES: &[AttrDef] = &[
    AttrDef::flag("editable", false),
    AttrDef::text("field"),
    AttrDef::flag("hidden", false),
    AttrDef::flag("readable", true),
];

const FIELD_PERMISSIONS: &[AttrDef] = &[
    AttrDef::flag("editable", false),
    AttrDef::text("field"),
    AttrDef::flag("readable", true),
];

const FLOW_ACCESSES: &[AttrDef] = &[AttrDef::boolean("enabled", false), AttrDef::text("flow")];

const LAYOUT_ASSIGNMENTS: &[AttrDef] = &[AttrDef::text("layout"), AttrDef::text("recordType")];

const LOGIN_HOURS: &[AttrDef] = &[AttrDef::text("weekdayStart"), AttrDef::text("weekdayEnd")];

const LOGIN_IP_RANGES: &[AttrDef] = &[
    AttrDef::text("description"),
    AttrDef::text("endAddress"),
    AttrDef::text("startAddress"),
];

const OBJECT_PERMISSIONS: &[AttrDef] = &[
    AttrDef::flag("revokeCreate", false).until(13),
    AttrDef::flag("revokeDelete", false).until(13),
    AttrDef::flag("revokeEdit", false).until(13),
    AttrDef::flag("allowCreate", false).since(14),
    AttrDef::flag("allowDelete", false).since(14),
    AttrDef::flag("allowEdit", false).since(14),
    AttrDef::flag("allowRead", false).since(14),
    AttrDef::flag("modifyAllRecords", false).since(15),
    AttrDef::text("object"),
    AttrDef::flag("viewAllRecords", false).since(15),
];

const PAGE_ACCESSES: &[AttrDef] = &[AttrDef::text("apexPage"), AttrDef::flag("enabled", false)];

const RECORD_TYPE_VISIBILITIES: &[AttrDef] = &[
    AttrDef::flag("default", false),
    AttrDef::flag("personAccountDefault", false).with_default(AttrDefault::Null),
    AttrDef::text("recordType"),
    AttrDef::flag("visible", true),
];

const TAB_VISIBILITIES: &[AttrDef] = &[AttrDef::text("tab"), AttrDef::text("visibility")];

const USER_PERMISSIONS: &[AttrDef] = &[AttrDef::flag("enabled", false), AttrDef::text("name")];

const CUSTOM: &[AttrDef] = &[AttrDef::boolean("custom", false)];
const DESCRIPTION: &[AttrDef] = &[AttrDef::text("description")];
const FULL_NAME: &[AttrDef] = &[AttrDef::text("fullName")];
const USER_LICENSE: &[AttrDef] = &[AttrDef::text("userLicense")];

/// Every category known to the registry, sorted by tag name.
pub static CATEGORIES: &[CategoryDef] = &[
    composite(
        "applicationVisibilities",
        APPLICATION_VISIBILITIES,
        keyed_by(&["application"]),
        VersionRange::until(44),
    ),
    composite(
        "categoryGroupVisibilities",
        CATEGORY_GROUP_VISIBILITIES,
        keyed_by(&["dataCategoryGroup"]),
        VersionRange::since(41),
    ),
    composite("classAccesses", CLASS_ACCESSES, keyed_by(&["apexClass"]), VersionRange::ALL),
    scalar("custom", CUSTOM, VersionRange::since(30)),
    composite(
        "customMetadataTypeAccesses",
        NAMED_ACCESSES,
        enabled_suffix(&["name"]),
        VersionRange::since(47),
    ),
    composite(
        "customPermissions",
        CUSTOM_PERMISSIONS,
        keyed_by(&["name"]),
        VersionRange::since(31),
    ),
    composite(
        "customSettingAccesses",
        NAMED_ACCESSES,
        enabled_suffix(&["name"]),
        VersionRange::since(47),
    ),
    scalar("description", DESCRIPTION, VersionRange::since(30)),
    composite(
        "externalDataSourceAccesses",
        EXTERNAL_DATA_SOURCE_ACCESSES,
        keyed_by(&["externalDataSource"]),
        VersionRange::since(27),
    ),
    composite(
        "fieldLevelSecurities",
        FIELD_LEVEL_SECURITIES,
        keyed_by(&["field"]),
        VersionRange::until(22),
    ),
    composite(
        "fieldPermissions",
        FIELD_PERMISSIONS,
        keyed_by(&["field"]),
        VersionRange::since(23),
    ),
    composite(
        "flowAccesses",
        FLOW_ACCESSES,
        enabled_suffix(&["flow"]),
        VersionRange::since(47),
    ),
    scalar("fullName", FULL_NAME, VersionRange::ALL),
    composite(
        "layoutAssignments",
        LAYOUT_ASSIGNMENTS,
        IdentityRule::PartsWithSuffix {
            parts: &["layout"],
            suffix: "recordType",
            when: SuffixWhen::NonEmpty,
        },
        VersionRange::ALL,
    ),
    composite(
        "loginHours",
        LOGIN_HOURS,
        keyed_by(&["weekdayStart", "weekdayEnd"]),
        VersionRange::since(25),
    ),
    composite(
        "loginIpRanges",
        LOGIN_IP_RANGES,
        keyed_by(&["description", "startAddress", "endAddress"]),
        VersionRange::since(17),
    ),
    composite("objectPermissions", OBJECT_PERMISSIONS, keyed_by(&["object"]), VersionRange::ALL),
    composite("pageAccesses", PAGE_ACCESSES, keyed_by(&["apexPage"]), VersionRange::ALL),
    composite(
        "profileActionOverrides",
        ACTION_OVERRIDES,
        keyed_by(&["actionName", "content", "pageOrSobjectType", "type"]),
        VersionRange::between(37, 44),
    ),
    composite(
        "recordTypeVisibilities",
        RECORD_TYPE_VISIBILITIES,
        keyed_by(&["recordType"]),
        VersionRange::since(29),
    ),
    composite(
        "tabVisibilities",
        TAB_VISIBILITIES,
        keyed_by(&["tab", "visibility"]),
        VersionRange::ALL,
    ),
    scalar("userLicense", USER_LICENSE, VersionRange::since(17)),
    composite(
        "userPermissions",
        USER_PERMISSIONS,
        keyed_by(&["name"]),
        VersionRange::since(29),
    ),
];
