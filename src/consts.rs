// Well-known names shared across the migration pipeline

/// Package that hosts the generated synthetic accessors
pub const SYNTHETIC_PACKAGE: &str = "kotlinx.android.synthetic";

/// Segment count of [`SYNTHETIC_PACKAGE`]
pub const SYNTHETIC_PACKAGE_PATH_LENGTH: usize = 3;

/// Import text marking a synthetic accessor import of the default variant
pub const SYNTHETIC_MAIN_IMPORT: &str = "kotlinx.android.synthetic.main";

/// Android resource XML namespace
pub const ANDROID_NAMESPACE: &str = "http://schemas.android.com/apk/res/android";

/// Attribute local name carrying a view id
pub const ID_ATTRIBUTE: &str = "id";

/// Attribute local name on an `<include>` tag naming the inlined layout
pub const LAYOUT_ATTRIBUTE: &str = "layout";

/// Tag local name that inlines another layout file
pub const INCLUDE_TAG: &str = "include";

/// Resource reference prefix declaring a new id
pub const NEW_ID_PREFIX: &str = "@+id/";

/// Suffix appended when synthesizing an id for an `<include>` without one
pub const INCLUDE_ID_SUFFIX: &str = "_view";

/// Fragment lifecycle function that receives the inflated view
pub const ON_VIEW_CREATED: &str = "onViewCreated";

/// Fragment lifecycle function where the binding must be released
pub const ON_DESTROY_VIEW: &str = "onDestroyView";

/// Activity call that installs the content view
pub const SET_CONTENT_VIEW: &str = "setContentView";

/// Alternate view-creation call matched when locating the content-view site
pub const ON_CREATE_VIEW: &str = "onCreateView";

/// Suffix of every generated binding class name
pub const BINDING_CLASS_SUFFIX: &str = "Binding";

/// Package segment under which binding classes are generated
pub const DATABINDING_SEGMENT: &str = "databinding";

/// Name of the default (main) build variant
pub const MAIN_VARIANT: &str = "main";

// Supertypes accepted for the two migratable class kinds. The host would
// answer this through full inheritance inspection; the tables cover the
// framework classes these screens extend directly.
pub const FRAGMENT_SUPERTYPES: &[&str] = &[
    "androidx.fragment.app.Fragment",
    "android.support.v4.app.Fragment",
    "android.app.Fragment",
    "androidx.fragment.app.DialogFragment",
];

pub const ACTIVITY_SUPERTYPES: &[&str] = &[
    "android.app.Activity",
    "androidx.appcompat.app.AppCompatActivity",
    "android.support.v7.app.AppCompatActivity",
    "androidx.activity.ComponentActivity",
    "androidx.fragment.app.FragmentActivity",
];

// Safety caps for guarded traversals
pub const DISCOVERY_MAX_NODES: usize = 200_000;
pub const WALKER_MAX_NODES: usize = 200_000;
